//! Reading and writing notebook files.
//!
//! This is the only part of the crate touching the filesystem: it reads a
//! notebook, hands the text to the parser, writes the preview markdown that the
//! HTML converter picks up, and appends newly composed posts.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::composer::{notebook_header, PostEntry};
use crate::config::Config;
use crate::notebook::{parse_notebook, Notebook};
use crate::post::ParseError;
use crate::projector::{normalize_filter, project_notebook, Projection};

/// Reads a notebook. Invalid UTF-8 is replaced rather than rejected.
pub fn read_notebook(path: &Path) -> Result<String, LibraryError> {
    let bytes = std::fs::read(path).map_err(|e| LibraryError::Read(path.to_path_buf(), e))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    debug!(
        "event=notebook_read module=library path={} bytes={}",
        path.display(),
        bytes.len()
    );
    Ok(text)
}

/// Reads and parses a notebook.
pub fn load_notebook(path: &Path) -> Result<Notebook, LibraryError> {
    let text = read_notebook(path)?;
    parse_notebook(&text).map_err(|source| {
        warn!(
            "event=notebook_parse module=library status=error path={} kind={:?}",
            path.display(),
            source.kind()
        );
        LibraryError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Projects the notebook at `path` with the given tag filter.
pub fn preview_notebook<S: AsRef<str>>(
    path: &Path,
    requested_tags: &[S],
) -> Result<Projection, LibraryError> {
    let notebook = load_notebook(path)?;
    let projection = project_notebook(&notebook, requested_tags);
    info!(
        "event=notebook_preview module=library status=ok path={} posts={} tags={}",
        path.display(),
        notebook.posts.len(),
        projection.tags.len()
    );
    Ok(projection)
}

/// Where the preview markdown of `notebook` filtered by `requested_tags` goes:
/// `<dir>/<preview_dir>/<stem>[_tag...].<extension>`.
///
/// Tags are normalized like the filter itself, so filters selecting the same
/// posts share one file, and reduced to file name safe characters.
pub fn preview_path<S: AsRef<str>>(
    notebook: &Path,
    requested_tags: &[S],
    config: &Config,
) -> PathBuf {
    let dir = notebook.parent().unwrap_or_else(|| Path::new("."));
    let mut base = notebook
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    for tag in normalize_filter(requested_tags) {
        base.push('_');
        base.push_str(&file_name_safe(&tag));
    }
    dir.join(&config.preview_dir)
        .join(format!("{base}.{}", config.extension))
}

fn file_name_safe(tag: &str) -> String {
    tag.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Writes the markdown of `projection` next to the notebook, for the converter.
pub fn write_preview<S: AsRef<str>>(
    notebook: &Path,
    requested_tags: &[S],
    projection: &Projection,
    config: &Config,
) -> Result<PathBuf, LibraryError> {
    let path = preview_path(notebook, requested_tags, config);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| LibraryError::Write(dir.to_path_buf(), e))?;
    }
    std::fs::write(&path, projection.markdown_text())
        .map_err(|e| LibraryError::Write(path.clone(), e))?;
    debug!(
        "event=preview_written module=library path={}",
        path.display()
    );
    Ok(path)
}

/// Appends a new post, dated today, to the notebook at `path`.
///
/// The post is separated from the existing text by a blank line. If the
/// notebook no longer parses afterwards, its previous bytes are restored
/// unchanged and the parse error returned.
pub fn append_post(path: &Path, entry: &PostEntry) -> Result<(), LibraryError> {
    entry.validate().map_err(LibraryError::InvalidEntry)?;
    let previous = std::fs::read(path).map_err(|e| LibraryError::Read(path.to_path_buf(), e))?;

    let mut addition = String::new();
    if !previous.is_empty() && !previous.ends_with(b"\n\n") {
        addition.push_str(if previous.ends_with(b"\n") { "\n" } else { "\n\n" });
    }
    addition.push_str(&entry.compose());

    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| LibraryError::Write(path.to_path_buf(), e))?;
    file.write_all(addition.as_bytes())
        .map_err(|e| LibraryError::Write(path.to_path_buf(), e))?;
    drop(file);

    if let Err(err) = load_notebook(path) {
        warn!(
            "event=post_append module=library status=rollback path={}",
            path.display()
        );
        std::fs::write(path, &previous).map_err(|e| LibraryError::Write(path.to_path_buf(), e))?;
        return Err(err);
    }
    info!(
        "event=post_append module=library status=ok path={} tags={}",
        path.display(),
        entry.tags.len()
    );
    Ok(())
}

/// Creates a notebook named `name` in `dir`, holding only its title.
pub fn create_notebook(dir: &Path, name: &str, config: &Config) -> Result<PathBuf, LibraryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LibraryError::InvalidEntry("notebook name is empty"));
    }
    let path = dir.join(config.notebook_file_name(name));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());

    std::fs::create_dir_all(dir).map_err(|e| LibraryError::Write(dir.to_path_buf(), e))?;
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => LibraryError::AlreadyExists(path.clone()),
            _ => LibraryError::Write(path.clone(), e),
        })?;
    file.write_all(notebook_header(&stem).as_bytes())
        .map_err(|e| LibraryError::Write(path.clone(), e))?;
    info!(
        "event=notebook_create module=library status=ok path={}",
        path.display()
    );
    Ok(path)
}

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("read error for {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("write error for {0}: {1}")]
    Write(PathBuf, std::io::Error),
    #[error("invalid notebook {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("notebook already exists: {0}")]
    AlreadyExists(PathBuf),
    #[error("invalid entry: {0}")]
    InvalidEntry(&'static str),
}
