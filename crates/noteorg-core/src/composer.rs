//! Raw text for new posts and new notebooks, ready to be written to disk.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Separators accepted between tags typed by the user.
pub const TAG_SEPARATORS: [char; 2] = [',', ';'];

/// A post as entered by the user, before it is written to a notebook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEntry {
    pub title: String,
    pub tags: Vec<String>,
    pub corpus: String,
}

impl PostEntry {
    pub fn new(title: impl Into<String>, tags: Vec<String>, corpus: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tags,
            corpus: corpus.into(),
        }
    }

    /// Splits a typed tag list such as `"layout; Widget, qt"`.
    pub fn split_tags(input: &str) -> Vec<String> {
        input
            .split(TAG_SEPARATORS)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Rejects entries that would not parse back as a post.
    pub fn validate(&self) -> Result<(), &'static str> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("post title is empty");
        }
        if title.chars().all(|c| c == '-') || title.chars().all(|c| c == '=') {
            return Err("post title would read as an underline");
        }
        if self.tags.iter().all(|t| t.trim().is_empty()) {
            return Err("post needs at least one tag");
        }
        if self.tags.iter().any(|t| t.contains([',', '\n', '\r'])) {
            return Err("tags cannot contain commas or line breaks");
        }
        Ok(())
    }

    /// The raw post text, dated today.
    pub fn compose(&self) -> String {
        create_post_from_entry(&self.title, &self.tags, &self.corpus)
    }
}

/// Raw text of a new post dated today.
pub fn create_post_from_entry<S: AsRef<str>>(title: &str, tags: &[S], corpus: &str) -> String {
    create_post_from_entry_dated(title, tags, corpus, Local::now().date_naive())
}

/// Raw text of a new post.
///
/// The title is kept on one line and underlined with as many dashes as it has
/// characters (at least two). The tag line is followed by a blank line, the
/// date, another blank line and the corpus.
pub fn create_post_from_entry_dated<S: AsRef<str>>(
    title: &str,
    tags: &[S],
    corpus: &str,
    date: NaiveDate,
) -> String {
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    let dashes = "-".repeat(title.chars().count().max(2));
    let tags = tags
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{title}\n{dashes}\n# {tags}\n\n*{}*\n\n{}\n",
        date.format("%d/%m/%Y"),
        corpus.trim_end_matches(['\n', '\r'])
    )
}

/// Opening lines of a new notebook named `name`.
pub fn notebook_header(name: &str) -> String {
    let name = name.trim();
    let mut chars = name.chars();
    let title = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    let underline = "=".repeat(title.chars().count().max(2));
    format!("{title}\n{underline}\n\n")
}
