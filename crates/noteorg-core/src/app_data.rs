//! Where the note organiser keeps its own data (config) and, by default, the
//! library of notebooks.

use std::path::PathBuf;

/// Folder holding the notebooks when none is configured, under the home directory.
pub const DEFAULT_LIBRARY_DIR: &str = ".noteorganiser";

/// Returns the directory where the note organiser stores its config.
/// On Linux: `~/.local/share/noteorganiser/`.
/// Creates the directory if it doesn't exist; returns `None` if we can't determine the path.
pub fn app_data_dir() -> Option<PathBuf> {
    let dir = directories::ProjectDirs::from("app", "NoteOrganiser", "noteorganiser")?
        .data_local_dir()
        .to_path_buf();
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// `~/.noteorganiser`, or `None` without a home directory. Not created here.
pub fn default_library_root() -> Option<PathBuf> {
    let base = directories::BaseDirs::new()?;
    Some(base.home_dir().join(DEFAULT_LIBRARY_DIR))
}
