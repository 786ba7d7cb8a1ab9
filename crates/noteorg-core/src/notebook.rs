//! Splitting a notebook into its title and posts.
//!
//! A notebook starts with a title underlined with `=` signs. Each post is
//! introduced by a title underlined with `-` signs; since a post title may span
//! several lines, the start of a post is found by walking back from its
//! separator to the previous blank line.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::post::{join_title, normalize_post, validate_post, ParseError, Post, SEPARATOR_RE};

static TITLE_UNDERLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^={2,}$").expect("valid title underline regex"));

/// How far back from a separator the start of a post is searched for.
/// Post titles longer than this are not split from the previous post.
pub const MAX_TITLE_SCAN: usize = 9;

/// A parsed notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notebook {
    pub title: String,
    pub posts: Vec<Post>,
}

impl Notebook {
    /// Every tag of every post, in file order, with repetitions.
    pub fn tag_occurrences(&self) -> impl Iterator<Item = &str> {
        self.posts
            .iter()
            .flat_map(|p| p.tags.iter().map(String::as_str))
    }
}

/// Parses the full text of a notebook.
pub fn parse_notebook(text: &str) -> Result<Notebook, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let (title, raw_posts) = extract_title_and_posts(&lines)?;
    let posts = raw_posts
        .iter()
        .map(|lines| Post::from_lines(lines))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Notebook { title, posts })
}

/// Recovers the notebook title and every post, normalized and validated.
///
/// The first invalid post aborts the whole extraction.
pub fn extract_title_and_posts<S: AsRef<str>>(
    lines: &[S],
) -> Result<(String, Vec<Vec<String>>), ParseError> {
    let lines: Vec<&str> = lines
        .iter()
        .map(|l| l.as_ref().trim_end_matches(['\n', '\r']))
        .collect();

    let mut title = None;
    let mut post_starts = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if title.is_none() && TITLE_UNDERLINE_RE.is_match(line) {
            title = Some(join_title(&lines[..index]));
        }
        if SEPARATOR_RE.is_match(line) {
            if let Some(start) = find_post_start(&lines, index) {
                post_starts.push(start);
            }
        }
    }
    let title = title.ok_or(ParseError::MissingTitle)?;

    let ends = post_starts
        .iter()
        .skip(1)
        .copied()
        .chain(std::iter::once(lines.len()));
    let posts = post_starts
        .iter()
        .zip(ends)
        .map(|(&start, end)| {
            let post = normalize_post(&lines[start..end])?;
            validate_post(&post)?;
            Ok(post)
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    Ok((title, posts))
}

/// Index of the first line of the post whose separator is at `separator`:
/// the line after the closest blank line or title underline above it, or the
/// first line of the file. `None` when neither lies within [`MAX_TITLE_SCAN`]
/// lines.
fn find_post_start(lines: &[&str], separator: usize) -> Option<usize> {
    for back in 1..=MAX_TITLE_SCAN {
        let Some(index) = separator.checked_sub(back) else {
            return Some(0);
        };
        if lines[index].trim().is_empty() || TITLE_UNDERLINE_RE.is_match(lines[index]) {
            return Some(index + 1);
        }
    }
    None
}
