//! Projection of a notebook into markdown for preview, filtered by tags.
//!
//! The markdown targets pandoc: posts are wrapped in blog-style `<article>`
//! blocks and headings carry class attributes picked up by the stylesheet.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::notebook::{parse_notebook, Notebook};
use crate::post::{ParseError, Post};

/// Tag to number of occurrences, most frequent first.
pub type TagTable = IndexMap<String, usize>;

/// Markdown for the posts that passed the filter, and the tags those posts
/// carry. The tag table is what a caller offers for further narrowing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub markdown: Vec<String>,
    pub tags: TagTable,
}

impl Projection {
    pub fn markdown_text(&self) -> String {
        self.markdown.join("\n")
    }
}

/// Parses `text` and projects the posts carrying every tag of `requested_tags`.
///
/// An empty filter keeps every post. Parse errors are returned unchanged and no
/// markdown is produced.
pub fn from_notes_to_markdown<S: AsRef<str>>(
    text: &str,
    requested_tags: &[S],
) -> Result<Projection, ParseError> {
    let notebook = parse_notebook(text)?;
    Ok(project_notebook(&notebook, requested_tags))
}

/// Same as [`from_notes_to_markdown`] over an already parsed notebook.
pub fn project_notebook<S: AsRef<str>>(notebook: &Notebook, requested_tags: &[S]) -> Projection {
    let filter = normalize_filter(requested_tags);
    let mut markdown = vec![
        "<article class='blog-header'>".to_string(),
        format!("# {} {{.blog-title}}", notebook.title),
        "</article>".to_string(),
        String::new(),
        "<article class='row'>".to_string(),
        "<article class='col-sm-12 blog-main'>".to_string(),
    ];
    let mut occurrences = Vec::new();
    for post in notebook.posts.iter().filter(|p| matches(p, &filter)) {
        occurrences.extend(post.tags.iter().map(String::as_str));
        markdown.extend(post_to_markdown(post));
    }
    markdown.extend(["</article>".to_string(), "</article>".to_string()]);

    Projection {
        markdown,
        tags: sort_tags(occurrences),
    }
}

/// Whether `post` carries every requested tag.
pub fn post_matches<S: AsRef<str>>(post: &Post, requested_tags: &[S]) -> bool {
    matches(post, &normalize_filter(requested_tags))
}

/// Counts tag occurrences, most frequent first. Tags with the same count keep
/// the order in which they were first seen.
pub fn sort_tags<I, S>(occurrences: I) -> TagTable
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut table = TagTable::new();
    for tag in occurrences {
        *table.entry(tag.into()).or_insert(0) += 1;
    }
    // stable
    table.sort_by(|_, a, _, b| b.cmp(a));
    table
}

/// Markdown block for a single post.
pub fn post_to_markdown(post: &Post) -> Vec<String> {
    let tags = post
        .tags
        .iter()
        .map(|t| format!("**{t}**"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut text = vec![
        String::new(),
        "<article class='blog-post' markdown=1>".to_string(),
        format!("## {} {{.blog-post-title}}", post.title),
        String::new(),
        "<p class='blog-post-meta'>".to_string(),
        format!("{}:", post.date.format("%Y-%m-%d")),
        tags,
        "</p>".to_string(),
    ];
    text.extend(post.corpus.iter().cloned());
    text.extend(["</article>".to_string(), String::new(), String::new()]);
    text
}

/// Requested tags trimmed, lowercased, deduplicated and sorted.
pub(crate) fn normalize_filter<S: AsRef<str>>(requested_tags: &[S]) -> BTreeSet<String> {
    requested_tags
        .iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn matches(post: &Post, filter: &BTreeSet<String>) -> bool {
    filter.iter().all(|tag| post.has_tag(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::ParseErrorKind;

    const PYSIDE: &str = "Pyside
======

Layout
------
# layout, widget
*08/11/2010*

Some text about layout.

Scroll
------
# scroll, clear
*09/11/2010*

More text.
";

    const NO_TAGS: &[&str] = &[];

    #[test]
    fn tag_sorting_is_by_count_then_first_seen() {
        let source = ["toto", "toto", "toto", "tata", "titi", "titi", "titi", "titi"];
        let table = sort_tags(source);
        let keys: Vec<&str> = table.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["titi", "toto", "tata"]);
        assert_eq!(table["titi"], 4);
        assert_eq!(table["toto"], 3);
        assert_eq!(table["tata"], 1);
    }

    #[test]
    fn ties_keep_encounter_order() {
        let table = sort_tags(["b", "a", "c", "a", "b"]);
        let keys: Vec<&str> = table.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn empty_filter_keeps_all_posts() {
        let projection = from_notes_to_markdown(PYSIDE, NO_TAGS).unwrap();
        let keys: BTreeSet<&str> = projection.tags.keys().map(String::as_str).collect();
        assert_eq!(keys, BTreeSet::from(["layout", "widget", "scroll", "clear"]));
        assert!(projection.tags.values().all(|&c| c == 1));
        let text = projection.markdown_text();
        assert!(text.contains("Some text about layout."));
        assert!(text.contains("More text."));
    }

    #[test]
    fn filter_narrows_posts_and_tags() {
        let projection = from_notes_to_markdown(PYSIDE, &["layout"]).unwrap();
        let text = projection.markdown_text();
        assert!(text.contains("Some text about layout."));
        assert!(!text.contains("More text."));
        let keys: Vec<&str> = projection.tags.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["layout", "widget"]);
    }

    #[test]
    fn filter_uses_and_semantics_and_ignores_case() {
        let projection = from_notes_to_markdown(PYSIDE, &[" Layout ", "scroll"]).unwrap();
        assert!(projection.tags.is_empty());

        let projection = from_notes_to_markdown(PYSIDE, &["SCROLL"]).unwrap();
        assert_eq!(projection.tags.len(), 2);
    }

    #[test]
    fn document_title_ranks_above_posts_in_file_order() {
        let projection = from_notes_to_markdown(PYSIDE, NO_TAGS).unwrap();
        let md = &projection.markdown;
        let doc = md.iter().position(|l| l.starts_with("# Pyside")).unwrap();
        let layout = md.iter().position(|l| l.starts_with("## Layout")).unwrap();
        let scroll = md.iter().position(|l| l.starts_with("## Scroll")).unwrap();
        assert!(doc < layout && layout < scroll);
        assert!(md.contains(&"2010-11-08:".to_string()));
        assert!(md.contains(&"**layout**, **widget**".to_string()));
    }

    #[test]
    fn parse_errors_propagate() {
        let err = from_notes_to_markdown("no title here\n", NO_TAGS).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::MissingTitle);

        let err = from_notes_to_markdown("T\n==\n\nP\n--\n# \n*01/01/2001*\n", NO_TAGS).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Tags);
    }

    #[test]
    fn narrower_filters_select_subsets() {
        let text = "T\n==\n\nA\n--\n# x, y\n*01/01/2001*\n\nB\n--\n# x\n*02/01/2001*\n\nC\n--\n# y, z\n*03/01/2001*\n";
        let notebook = parse_notebook(text).unwrap();
        let filters: [&[&str]; 5] = [&[], &["x"], &["y"], &["x", "y"], &["x", "y", "z"]];
        let selected = |filter: &[&str]| -> BTreeSet<String> {
            notebook
                .posts
                .iter()
                .filter(|p| post_matches(p, filter))
                .map(|p| p.title.clone())
                .collect()
        };
        for wide in filters {
            for narrow in filters {
                if wide.iter().all(|t| narrow.contains(t)) {
                    assert!(selected(narrow).is_subset(&selected(wide)));
                }
            }
        }
        assert_eq!(selected(&["x", "y"]), BTreeSet::from(["A".to_string()]));
    }
}
