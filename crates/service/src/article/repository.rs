use async_trait::async_trait;

use super::domain::{Article, ArticleInput};
use crate::errors::ServiceError;

/// Trait abstraction for article storage.
/// "Not found" is an absence (`None` / `false`), never an error.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// All parsable articles, newest first, with raw content.
    async fn list(&self) -> Result<Vec<Article>, ServiceError>;
    /// One article with raw content.
    async fn read(&self, filename: &str) -> Result<Option<Article>, ServiceError>;
    /// One article with content rendered to HTML.
    async fn get(&self, filename: &str) -> Result<Option<Article>, ServiceError>;
    /// Create (no filename) or fully overwrite (filename); returns the filename used.
    async fn save(&self, input: ArticleInput, filename: Option<&str>) -> Result<String, ServiceError>;
    /// Remove an article; returns whether it existed.
    async fn delete(&self, filename: &str) -> Result<bool, ServiceError>;
}

/// Simple in-memory repository for tests and doc examples.
///
/// Stores encoded units exactly as the file store would write them and counts
/// every mutating call, so callers can assert that nothing was written.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard};

    use crate::article::codec::{encode_article, parse_article, save_target};
    use crate::article::domain::sort_newest_first;
    use crate::article::render::render_markdown;

    #[derive(Default)]
    pub struct MemoryArticleRepository {
        units: Mutex<HashMap<String, String>>, // key: filename, value: encoded unit
        mutations: AtomicUsize,
    }

    impl MemoryArticleRepository {
        /// Number of `save`/`delete` calls that reached the repository.
        pub fn mutations(&self) -> usize {
            self.mutations.load(Ordering::SeqCst)
        }

        /// Seed a raw unit, bypassing validation.
        pub fn insert_raw(&self, filename: &str, raw: &str) {
            self.units().insert(filename.to_string(), raw.to_string());
        }

        fn units(&self) -> MutexGuard<'_, HashMap<String, String>> {
            self.units.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        fn parse(filename: &str, raw: &str) -> Result<Article, ServiceError> {
            parse_article(filename, raw).map_err(|e| ServiceError::Malformed {
                filename: filename.to_string(),
                reason: e.to_string(),
            })
        }
    }

    #[async_trait]
    impl ArticleRepository for MemoryArticleRepository {
        async fn list(&self) -> Result<Vec<Article>, ServiceError> {
            let units = self.units();
            let mut articles: Vec<Article> = units
                .iter()
                .filter_map(|(name, raw)| parse_article(name, raw).ok())
                .collect();
            sort_newest_first(&mut articles);
            Ok(articles)
        }

        async fn read(&self, filename: &str) -> Result<Option<Article>, ServiceError> {
            let units = self.units();
            units.get(filename).map(|raw| Self::parse(filename, raw)).transpose()
        }

        async fn get(&self, filename: &str) -> Result<Option<Article>, ServiceError> {
            let article = self.read(filename).await?;
            Ok(article.map(|mut a| {
                a.content = render_markdown(&a.content);
                a
            }))
        }

        async fn save(&self, input: ArticleInput, filename: Option<&str>) -> Result<String, ServiceError> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            let target = save_target(&input, filename)?;
            let mut units = self.units();
            if target.create_new && units.contains_key(&target.filename) {
                return Err(ServiceError::Conflict(format!("{} already exists", target.filename)));
            }
            units.insert(target.filename.clone(), encode_article(&input.title, &input.date, &input.content));
            Ok(target.filename)
        }

        async fn delete(&self, filename: &str) -> Result<bool, ServiceError> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            Ok(self.units().remove(filename).is_some())
        }
    }

}
