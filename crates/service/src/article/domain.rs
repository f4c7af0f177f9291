use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Snapshot of one stored article.
///
/// `content` is the raw Markdown for `list`/`read` and the rendered HTML
/// for `get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub filename: String,
    pub title: String,
    pub date: String,
    pub content: String,
}

/// Operator-submitted fields for a create or an overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleInput {
    pub title: String,
    pub content: String,
    pub date: String,
}

impl ArticleInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>, date: impl Into<String>) -> Self {
        Self { title: title.into(), content: content.into(), date: date.into() }
    }

    /// Title and date each occupy exactly one header line.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.title.contains(['\n', '\r']) {
            return Err(ServiceError::Validation("title must be a single line".into()));
        }
        if self.date.contains(['\n', '\r']) {
            return Err(ServiceError::Validation("date must be a single line".into()));
        }
        Ok(())
    }
}

/// Newest first by lexical date; filename breaks ties.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.filename.cmp(&b.filename)));
}
