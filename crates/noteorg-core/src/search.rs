//! Loose, case-insensitive matching used to find notebooks and posts by name.

use crate::post::Post;

/// Whether `query` loosely matches `candidate`.
///
/// Both sides are lowercased and every whitespace character becomes a plain
/// space. The query matches if it is a substring of the candidate or, when it
/// has several words, if each word matches on its own.
pub fn fuzzy_match(query: &str, candidate: &str) -> bool {
    let query = normalize(query);
    let candidate = normalize(candidate);
    matches_normalized(&query, &candidate)
}

/// Posts whose title matches `query`, in notebook order.
pub fn find_posts<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    posts
        .iter()
        .filter(|p| fuzzy_match(query, &p.title))
        .collect()
}

fn matches_normalized(query: &str, candidate: &str) -> bool {
    if candidate.contains(query) {
        return true;
    }
    query.contains(' ')
        && query
            .split(' ')
            .all(|word| matches_normalized(word, candidate))
}

fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect()
}
