use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use configs::MalformedPolicy;
use tokio::{
    fs::{self, OpenOptions},
    io::{AsyncWrite, AsyncWriteExt},
};
use tracing::{debug, info, instrument, warn};

use crate::article::codec::{encode_article, is_valid_key, parse_article, save_target, ARTICLE_SUFFIX};
use crate::article::domain::{sort_newest_first, Article, ArticleInput};
use crate::article::render::render_markdown;
use crate::article::repository::ArticleRepository;
use crate::errors::ServiceError;

/// Appended to a quarantined unit so it drops out of the `.md` namespace.
pub const QUARANTINE_SUFFIX: &str = ".malformed";

/// Directory-backed article store: one `.md` file per article.
///
/// # Examples
/// ```
/// use configs::MalformedPolicy;
/// use service::article::ArticleInput;
/// use service::file::article_store::FileArticleStore;
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = tokio_test::block_on(FileArticleStore::new(dir.path(), MalformedPolicy::Skip)).unwrap();
/// let input = ArticleInput::new("Test Article", "Test content", "2026-02-25");
/// let name = tokio_test::block_on(store.save(input, None)).unwrap();
/// assert_eq!(name, "test_article_2026-02-25.md");
/// ```
#[derive(Debug, Clone)]
pub struct FileArticleStore {
    dir: PathBuf,
    policy: MalformedPolicy,
}

impl FileArticleStore {
    /// Open the store rooted at `dir`, creating the directory if missing.
    pub async fn new<P: Into<PathBuf>>(dir: P, policy: MalformedPolicy) -> Result<Arc<Self>, ServiceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::storage("create storage directory", e))?;
        Ok(Arc::new(Self { dir, policy }))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    fn malformed(filename: &str, reason: impl Into<String>) -> ServiceError {
        ServiceError::Malformed { filename: filename.to_string(), reason: reason.into() }
    }

    /// Whether `filename` names a regular file in the storage directory, the
    /// same entries `list()` considers.
    async fn is_unit(&self, filename: &str) -> Result<bool, ServiceError> {
        if !is_valid_key(filename) {
            debug!(%filename, "rejecting invalid article key");
            return Ok(false);
        }
        match fs::symlink_metadata(self.path_for(filename)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ServiceError::storage(&format!("stat {filename}"), e)),
        }
    }

    /// Raw text of a unit; `None` for unknown or invalid keys.
    async fn read_unit(&self, filename: &str) -> Result<Option<String>, ServiceError> {
        if !self.is_unit(filename).await? {
            return Ok(None);
        }
        match fs::read_to_string(self.path_for(filename)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(Self::malformed(filename, "not valid UTF-8")),
            Err(e) => Err(ServiceError::storage(&format!("read {filename}"), e)),
        }
    }

    async fn handle_malformed(&self, filename: &str, reason: String) -> Result<(), ServiceError> {
        match self.policy {
            MalformedPolicy::Skip => {
                warn!(%filename, %reason, "skipping malformed article");
                Ok(())
            }
            MalformedPolicy::Fail => Err(Self::malformed(filename, reason)),
            MalformedPolicy::Quarantine => {
                let target = self.quarantine_path(filename).await?;
                fs::rename(self.path_for(filename), &target)
                    .await
                    .map_err(|e| ServiceError::storage(&format!("quarantine {filename}"), e))?;
                warn!(%filename, %reason, target = %target.display(), "quarantined malformed article");
                Ok(())
            }
        }
    }

    /// First free `<filename>.malformed`, `<filename>.malformed.1`, ... so an
    /// earlier quarantined copy is never replaced.
    async fn quarantine_path(&self, filename: &str) -> Result<PathBuf, ServiceError> {
        let base = format!("{filename}{QUARANTINE_SUFFIX}");
        let mut candidate = self.path_for(&base);
        let mut n = 0u32;
        while fs::try_exists(&candidate)
            .await
            .map_err(|e| ServiceError::storage(&format!("quarantine {filename}"), e))?
        {
            n += 1;
            candidate = self.path_for(&format!("{base}.{n}"));
        }
        Ok(candidate)
    }

    /// List every parsable article, newest first.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn list(&self) -> Result<Vec<Article>, ServiceError> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| ServiceError::storage("read storage directory", e))?;

        let mut articles = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ServiceError::storage("read storage directory", e))?
        {
            let Ok(name) = entry.file_name().into_string() else { continue };
            if !name.ends_with(ARTICLE_SUFFIX) || !is_valid_key(&name) {
                continue;
            }
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| ServiceError::storage(&format!("stat {name}"), e))?;
            if !file_type.is_file() {
                continue;
            }

            let parsed = match fs::read_to_string(entry.path()).await {
                Ok(raw) => parse_article(&name, &raw).map_err(|e| e.to_string()),
                Err(e) if e.kind() == ErrorKind::InvalidData => Err("not valid UTF-8".to_string()),
                // removed between read_dir and read
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(ServiceError::storage(&format!("read {name}"), e)),
            };
            match parsed {
                Ok(article) => articles.push(article),
                Err(reason) => self.handle_malformed(&name, reason).await?,
            }
        }

        sort_newest_first(&mut articles);
        debug!(count = articles.len(), "listed articles");
        Ok(articles)
    }

    /// Fetch one article with its raw Markdown content.
    pub async fn read(&self, filename: &str) -> Result<Option<Article>, ServiceError> {
        let Some(raw) = self.read_unit(filename).await? else { return Ok(None) };
        parse_article(filename, &raw)
            .map(Some)
            .map_err(|e| Self::malformed(filename, e.to_string()))
    }

    /// Fetch one article with its content rendered to HTML.
    #[instrument(skip(self))]
    pub async fn get(&self, filename: &str) -> Result<Option<Article>, ServiceError> {
        let Some(mut article) = self.read(filename).await? else {
            debug!("article not found");
            return Ok(None);
        };
        article.content = render_markdown(&article.content);
        Ok(Some(article))
    }

    /// Create or overwrite an article; returns the filename written.
    #[instrument(skip(self, input), fields(title = %input.title, date = %input.date))]
    pub async fn save(&self, input: ArticleInput, filename: Option<&str>) -> Result<String, ServiceError> {
        let target = save_target(&input, filename)?;
        let body = encode_article(&input.title, &input.date, &input.content);
        let path = self.path_for(&target.filename);

        if target.create_new {
            let file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    return Err(ServiceError::Conflict(format!("{} already exists", target.filename)));
                }
                Err(e) => return Err(ServiceError::storage(&format!("create {}", target.filename), e)),
            };
            fill_new_unit(&path, file, body.as_bytes())
                .await
                .map_err(|e| ServiceError::storage(&format!("write {}", target.filename), e))?;
        } else {
            fs::write(&path, body)
                .await
                .map_err(|e| ServiceError::storage(&format!("write {}", target.filename), e))?;
        }

        info!(filename = %target.filename, created = target.create_new, "article saved");
        Ok(target.filename)
    }

    /// Remove an article; `false` when there was nothing to remove.
    #[instrument(skip(self))]
    pub async fn delete(&self, filename: &str) -> Result<bool, ServiceError> {
        if !self.is_unit(filename).await? {
            return Ok(false);
        }
        match fs::remove_file(self.path_for(filename)).await {
            Ok(()) => {
                info!("article deleted");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ServiceError::storage(&format!("delete {filename}"), e)),
        }
    }
}

/// Write the body of a unit that `save` has just created. On failure the file
/// is removed again, otherwise the half-written unit would hold its name and
/// turn every later add of the same title and date into a conflict.
async fn fill_new_unit<W>(path: &Path, mut file: W, body: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        file.write_all(body).await?;
        file.flush().await
    }
    .await;
    if let Err(e) = written {
        drop(file);
        if let Err(rm) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %rm, "failed to remove partially written article");
        }
        return Err(e);
    }
    Ok(())
}

#[async_trait]
impl ArticleRepository for FileArticleStore {
    async fn list(&self) -> Result<Vec<Article>, ServiceError> { self.list().await }
    async fn read(&self, filename: &str) -> Result<Option<Article>, ServiceError> { self.read(filename).await }
    async fn get(&self, filename: &str) -> Result<Option<Article>, ServiceError> { self.get(filename).await }
    async fn save(&self, input: ArticleInput, filename: Option<&str>) -> Result<String, ServiceError> { self.save(input, filename).await }
    async fn delete(&self, filename: &str) -> Result<bool, ServiceError> { self.delete(filename).await }
}
