//! Flat-file article format.
//!
//! ```text
//! # <title>
//! <date>
//! <content, verbatim>
//! ```

use thiserror::Error;

use super::domain::{Article, ArticleInput};
use crate::errors::ServiceError;

pub const ARTICLE_SUFFIX: &str = ".md";
pub const TITLE_MARKER: &str = "# ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("file is empty")]
    Empty,
    #[error("missing date line")]
    MissingDateLine,
}

/// Where a save lands and whether it may replace an existing unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTarget {
    pub filename: String,
    /// Synthesized names must not clobber an existing article.
    pub create_new: bool,
}

/// Split a stored unit into its header fields and raw content.
pub fn parse_article(filename: &str, raw: &str) -> Result<Article, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }
    let (title_line, rest) = raw.split_once('\n').ok_or(ParseError::MissingDateLine)?;
    if rest.is_empty() {
        return Err(ParseError::MissingDateLine);
    }
    let (date_line, content) = rest.split_once('\n').unwrap_or((rest, ""));

    Ok(Article {
        filename: filename.to_string(),
        title: clean_title(title_line),
        date: date_line.trim().to_string(),
        content: content.to_string(),
    })
}

/// Only the single leading marker goes; `#` inside or at the end of a title is content.
fn clean_title(line: &str) -> String {
    let line = line.trim();
    line.strip_prefix(TITLE_MARKER.trim_end()).unwrap_or(line).trim().to_string()
}

pub fn encode_article(title: &str, date: &str, content: &str) -> String {
    format!("{TITLE_MARKER}{title}\n{date}\n{content}")
}

/// `"Test Article"` + `"2026-02-25"` → `"test_article_2026-02-25.md"`.
pub fn synthesize_filename(title: &str, date: &str) -> String {
    format!("{}_{}{}", title.to_lowercase().replace(' ', "_"), date, ARTICLE_SUFFIX)
}

/// A key names a single file directly inside the storage directory.
pub fn is_valid_key(key: &str) -> bool {
    let Some(stem) = key.strip_suffix(ARTICLE_SUFFIX) else { return false };
    !stem.is_empty() && !key.starts_with('.') && !key.contains(['/', '\\', '\0'])
}

/// Validate the input and decide which filename a save writes to.
pub fn save_target(input: &ArticleInput, filename: Option<&str>) -> Result<SaveTarget, ServiceError> {
    input.validate()?;
    let target = match filename {
        Some(name) => SaveTarget { filename: name.to_string(), create_new: false },
        None => SaveTarget { filename: synthesize_filename(&input.title, &input.date), create_new: true },
    };
    if !is_valid_key(&target.filename) {
        return Err(ServiceError::Validation(format!("invalid article filename: {:?}", target.filename)));
    }
    Ok(target)
}
