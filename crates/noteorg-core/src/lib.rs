//! All note organiser logic independent of how the app is run (CLI or desktop shell).
//!
//! Parsing and projection ([notebook], [post], [projector], [composer],
//! [search]) are pure functions over text. Only [library] touches the
//! filesystem and only it logs.

pub mod app_data;
pub mod composer;
pub mod config;
pub mod library;
pub mod logging;
pub mod notebook;
pub mod post;
pub mod projector;
pub mod search;

pub use app_data::{app_data_dir, default_library_root};
pub use composer::{
    create_post_from_entry, create_post_from_entry_dated, notebook_header, PostEntry,
};
pub use config::{load_config, load_config_from, Config, ConfigError};
pub use library::{
    append_post, create_notebook, load_notebook, preview_notebook, read_notebook, write_preview,
    LibraryError,
};
pub use logging::{init_logging, LoggingError};
pub use notebook::{extract_title_and_posts, parse_notebook, Notebook};
pub use post::{
    extract_corpus_from_post, extract_date_from_post, extract_tags_from_post,
    extract_title_from_post, normalize_post, validate_post, ParseError, ParseErrorKind, Post,
};
pub use projector::{
    from_notes_to_markdown, post_matches, project_notebook, sort_tags, Projection, TagTable,
};
pub use search::{find_posts, fuzzy_match};

/// Returns a short status string. Used to verify the backend is wired up.
pub fn status() -> &'static str {
    "noteorg-core ready"
}
