//! A single post: its line-level structure, validation, and field extraction.
//!
//! A normalized post always starts with four header lines (title, dashes, tag
//! line, date line) followed by the corpus. Extractors take the post lines and
//! return the extracted value together with the lines that remain, so they are
//! chained in a fixed order: tags, then date, then corpus.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub(crate) static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-{2,}$").expect("valid separator regex"));
static TAG_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#").expect("valid tag line regex"));
/// Matches a date at the start of a line; trailing text is allowed.
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\*([0-9]{2})/([0-1][0-9])/([0-9]{4})\*").expect("valid date regex")
});
/// A line holding nothing but a date.
static DATE_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\*[0-9]{2}/[0-1][0-9]/[0-9]{4}\*$").expect("valid date line regex")
});

/// Number of header lines in a normalized post.
pub const HEADER_LINES: usize = 4;

/// A parsed post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub title: String,
    /// Lowercased, in declaration order.
    pub tags: Vec<String>,
    pub date: NaiveDate,
    /// Body lines, verbatim. Trailing blank lines are dropped.
    pub corpus: Vec<String>,
}

impl Post {
    /// Builds a post from normalized lines.
    ///
    /// Runs the extractors in their only valid order: tags are stripped first,
    /// then the date, and the corpus is what remains after the title and the
    /// separator.
    pub fn from_lines(lines: &[String]) -> Result<Self, ParseError> {
        let title = extract_title_from_post(lines);
        let (tags, rest) = extract_tags_from_post(lines)?;
        let (date, rest) = extract_date_from_post(&rest)?;
        let mut corpus = extract_corpus_from_post(&rest);
        while corpus.last().is_some_and(|l| l.trim().is_empty()) {
            corpus.pop();
        }
        Ok(Self {
            title,
            tags,
            date,
            corpus,
        })
    }

    /// Corpus joined with newlines.
    pub fn body(&self) -> String {
        self.corpus.join("\n")
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Checks that a normalized post has every mandatory header line.
///
/// Blank lines are ignored. The separator must be preceded by a non-empty
/// title and followed by the tag line and then a line holding only a
/// `*DD/MM/YYYY*` date that names a real calendar day.
pub fn validate_post(post: &[String]) -> Result<(), ParseError> {
    let structure = |reason: &'static str| ParseError::PostStructure {
        reason,
        lines: post.to_vec(),
    };

    let filled: Vec<&str> = post
        .iter()
        .map(String::as_str)
        .filter(|l| !l.is_empty())
        .collect();
    if filled.len() < HEADER_LINES {
        return Err(structure("post contains under four lines"));
    }
    let index = filled
        .iter()
        .position(|l| SEPARATOR_RE.is_match(l))
        .ok_or_else(|| structure("post does not contain dashes"))?;
    if index == 0 || filled[0].trim().is_empty() {
        return Err(structure("post title is empty"));
    }
    match filled.get(index + 1) {
        Some(line) if TAG_LINE_RE.is_match(line) => {}
        _ => return Err(structure("tags were not found after the dashes")),
    }
    let date_line = match filled.get(index + 2) {
        Some(line) if DATE_LINE_RE.is_match(line) => *line,
        _ => return Err(structure("the date could not be read")),
    };
    parse_date_line(date_line, post)?;
    Ok(())
}

/// Puts a raw post in normalized form.
///
/// Trailing line breaks are stripped, a title spread over several lines is
/// merged into one, and blank lines between the header lines are dropped. The
/// corpus is kept verbatim from its first non-blank line. Applying this twice
/// gives the same result as applying it once.
pub fn normalize_post<S: AsRef<str>>(post: &[S]) -> Result<Vec<String>, ParseError> {
    let lines: Vec<String> = post
        .iter()
        .map(|l| l.as_ref().trim_end_matches(['\n', '\r']).to_string())
        .collect();
    let structure = |reason: &'static str| ParseError::PostStructure {
        reason,
        lines: lines.clone(),
    };

    let dash_index = lines
        .iter()
        .position(|l| SEPARATOR_RE.is_match(l))
        .ok_or_else(|| structure("post does not contain dashes"))?;
    let title = join_title(&lines[..dash_index]);

    let tag_index = lines[dash_index + 1..]
        .iter()
        .position(|l| TAG_LINE_RE.is_match(l))
        .map(|i| i + dash_index + 1)
        .ok_or_else(|| structure("tags were not found after the dashes"))?;
    let date_index = lines[tag_index + 1..]
        .iter()
        .position(|l| DATE_RE.is_match(l))
        .map(|i| i + tag_index + 1)
        .ok_or_else(|| structure("the date could not be read"))?;

    let mut normalized = vec![
        title,
        lines[dash_index].clone(),
        lines[tag_index].clone(),
        lines[date_index].clone(),
    ];
    if let Some(start) = lines[date_index + 1..]
        .iter()
        .position(|l| !l.is_empty())
        .map(|i| i + date_index + 1)
    {
        normalized.extend_from_slice(&lines[start..]);
    }
    Ok(normalized)
}

/// Recovers the tags from a normalized post.
///
/// The tag line is the third line. Tags are comma separated, trimmed and
/// lowercased; empty entries are dropped. Returns the post without its tag
/// line.
pub fn extract_tags_from_post(post: &[String]) -> Result<(Vec<String>, Vec<String>), ParseError> {
    let missing = || ParseError::MissingTags {
        lines: post.to_vec(),
    };
    let tag_line = post.get(2).map(|l| l.trim()).ok_or_else(missing)?;
    let declared = tag_line.strip_prefix('#').ok_or_else(missing)?;
    let tags: Vec<String> = declared
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if tags.is_empty() {
        return Err(missing());
    }
    let rest = post[..2].iter().chain(&post[3..]).cloned().collect();
    Ok((tags, rest))
}

/// First line of a normalized post.
pub fn extract_title_from_post(post: &[String]) -> String {
    post.first().cloned().unwrap_or_default()
}

/// Recovers the date from a post whose tag line was already removed.
///
/// The first line after the title starting with `*DD/MM/YYYY*` is used and
/// removed from the returned post.
pub fn extract_date_from_post(post: &[String]) -> Result<(NaiveDate, Vec<String>), ParseError> {
    let index = post
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, l)| DATE_RE.is_match(l))
        .map(|(i, _)| i)
        .ok_or_else(|| ParseError::MissingDate {
            lines: post.to_vec(),
        })?;
    let date = parse_date_line(&post[index], post)?;
    let rest = post[..index].iter().chain(&post[index + 1..]).cloned().collect();
    Ok((date, rest))
}

/// Body of a post whose tag and date lines were already removed: everything
/// after the title and the separator.
pub fn extract_corpus_from_post(post: &[String]) -> Vec<String> {
    post.get(2..).map(<[String]>::to_vec).unwrap_or_default()
}

/// Trims each line and joins the non-blank ones with single spaces.
pub(crate) fn join_title<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_date_line(line: &str, post: &[String]) -> Result<NaiveDate, ParseError> {
    let invalid = || ParseError::InvalidDate {
        date: line.to_string(),
        lines: post.to_vec(),
    };
    let caps = DATE_RE.captures(line).ok_or_else(invalid)?;
    let day: u32 = caps[1].parse().map_err(|_| invalid())?;
    let month: u32 = caps[2].parse().map_err(|_| invalid())?;
    let year: i32 = caps[3].parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

fn indent(lines: &[String]) -> String {
    lines
        .iter()
        .map(|l| format!("    {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Coarse category of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseErrorKind {
    MissingTitle,
    Structure,
    Tags,
    Date,
    InvalidDate,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("you should specify a title to your notebook, underlined with = signs")]
    MissingTitle,
    #[error("{reason}:\n\n{}", indent(.lines))]
    PostStructure {
        reason: &'static str,
        lines: Vec<String>,
    },
    #[error("no tags specified in the post:\n\n{}", indent(.lines))]
    MissingTags { lines: Vec<String> },
    #[error("no date found in the post:\n\n{}", indent(.lines))]
    MissingDate { lines: Vec<String> },
    #[error("`{date}` is not a valid date:\n\n{}", indent(.lines))]
    InvalidDate { date: String, lines: Vec<String> },
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::MissingTitle => ParseErrorKind::MissingTitle,
            Self::PostStructure { .. } => ParseErrorKind::Structure,
            Self::MissingTags { .. } => ParseErrorKind::Tags,
            Self::MissingDate { .. } => ParseErrorKind::Date,
            Self::InvalidDate { .. } => ParseErrorKind::InvalidDate,
        }
    }

    /// The offending post lines, empty for a missing title.
    pub fn lines(&self) -> &[String] {
        match self {
            Self::MissingTitle => &[],
            Self::PostStructure { lines, .. }
            | Self::MissingTags { lines }
            | Self::MissingDate { lines }
            | Self::InvalidDate { lines, .. } => lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extract_tags_lowercases_and_strips_line() {
        let post = lines(&["Toto", "-------", " # Non-linear, pk", "*21/12/2012*"]);
        let (tags, rest) = extract_tags_from_post(&post).unwrap();
        assert_eq!(tags, vec!["non-linear", "pk"]);
        assert_eq!(rest, lines(&["Toto", "-------", "*21/12/2012*"]));
    }

    #[test]
    fn extract_tags_rejects_empty_tag_line() {
        let post = lines(&["Toto", "-------", "# ", "*21/12/2012*"]);
        let err = extract_tags_from_post(&post).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Tags);

        let post = lines(&["Toto", "-------", "# , ,", "*21/12/2012*"]);
        assert!(extract_tags_from_post(&post).is_err());
    }

    #[test]
    fn extract_title_is_first_line() {
        let post = lines(&["Toto", "-------", "# non-linear, pk", "*21/12/2012*"]);
        assert_eq!(extract_title_from_post(&post), "Toto");
    }

    #[test]
    fn extract_date_searches_and_strips_line() {
        let post = lines(&["Toto", "-------", "*21/12/2012*", "Something something"]);
        let (date, rest) = extract_date_from_post(&post).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2012, 12, 21).unwrap());
        assert_eq!(rest, lines(&["Toto", "-------", "Something something"]));

        let post = lines(&["Toto", "-------", "", "*01/02/2003*"]);
        let (date, rest) = extract_date_from_post(&post).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2003, 2, 1).unwrap());
        assert_eq!(rest, lines(&["Toto", "-------", ""]));
    }

    #[test]
    fn extract_date_reports_missing_and_invalid() {
        let err = extract_date_from_post(&lines(&["Toto", "---------", "meh"])).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Date);

        let err = extract_date_from_post(&lines(&["Toto", "---", "*31/02/2012*"])).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::InvalidDate);
    }

    #[test]
    fn extract_corpus_after_header_removal() {
        let post = lines(&[
            "Toto",
            "-------",
            "# non-linear, pk",
            "*21/12/2012*",
            "This morning I woke",
            "",
            "up and it was a nice weather",
        ]);
        let (_, rest) = extract_tags_from_post(&post).unwrap();
        let (_, rest) = extract_date_from_post(&rest).unwrap();
        assert_eq!(
            extract_corpus_from_post(&rest),
            lines(&["This morning I woke", "", "up and it was a nice weather"])
        );
    }

    #[test]
    fn validate_accepts_good_post() {
        let good = lines(&["Toto", "-------", "# non-linear, pk", "*21/12/2012*"]);
        assert!(validate_post(&good).is_ok());
    }

    #[test]
    fn validate_rejects_malformed_posts() {
        let bad = [
            vec!["Toto", "-------", "*21/12/2012*"],
            vec!["Toto", "=======", "# something", "*21/12/2012*"],
            vec!["", "-------", "# non-linear, pk", "*21/12/2012*"],
            vec!["Toto", "-------", "*21/12/2012*", "something"],
        ];
        for post in bad {
            let err = validate_post(&lines(&post)).unwrap_err();
            assert_eq!(err.kind(), ParseErrorKind::Structure, "{post:?}");
        }

        let err = validate_post(&lines(&["Toto", "-----", "# something", "12/12/042*"])).unwrap_err();
        assert!(matches!(
            err.kind(),
            ParseErrorKind::Structure | ParseErrorKind::InvalidDate
        ));
    }

    #[test]
    fn validate_rejects_out_of_range_month() {
        let post = lines(&["Toto", "-----", "# something", "*12/13/2012*"]);
        let err = validate_post(&post).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::InvalidDate);
    }

    #[test]
    fn structure_error_carries_post_lines() {
        let post = lines(&["Toto", "-------", "*21/12/2012*"]);
        let err = validate_post(&post).unwrap_err();
        assert_eq!(err.lines(), post.as_slice());
        assert!(err.to_string().contains("    Toto"));
    }

    #[test]
    fn normalize_merges_long_title() {
        let post = ["Toto", "has a long title", "-------", "# bla", "*08/11/2010*"];
        let normalized = normalize_post(&post).unwrap();
        assert_eq!(
            normalized,
            lines(&["Toto has a long title", "-------", "# bla", "*08/11/2010*"])
        );
        assert!(validate_post(&normalized).is_ok());
    }

    #[test]
    fn normalize_drops_header_blanks_and_line_breaks() {
        let post = [
            "Title\n",
            "-----\n",
            "\n",
            "# a, b\n",
            "\n",
            "*08/11/2010*\n",
            "\n",
            "first\n",
            "\n",
            "second\n",
        ];
        let normalized = normalize_post(&post).unwrap();
        assert_eq!(
            normalized,
            lines(&["Title", "-----", "# a, b", "*08/11/2010*", "first", "", "second"])
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let post = [
            "A title",
            "spread out",
            "----------",
            "",
            "# x",
            "",
            "*01/01/2001*",
            "",
            "",
            "body",
            "",
        ];
        let once = normalize_post(&post).unwrap();
        let twice = normalize_post(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn post_from_lines_runs_pipeline() {
        let post = lines(&[
            "Layout",
            "------",
            "# Layout, widget",
            "*08/11/2010*",
            "Some text.",
            "",
            "",
        ]);
        let post = Post::from_lines(&post).unwrap();
        assert_eq!(post.title, "Layout");
        assert_eq!(post.tags, vec!["layout", "widget"]);
        assert_eq!(post.date, NaiveDate::from_ymd_opt(2010, 11, 8).unwrap());
        assert_eq!(post.corpus, vec!["Some text."]);
        assert!(post.has_tag("widget"));
    }
}
