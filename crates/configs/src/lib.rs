use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// What `list()` does with an article file it cannot parse.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Log and leave the file out of the listing.
    #[default]
    Skip,
    /// Abort the whole listing with an error.
    Fail,
    /// Rename the file out of the article namespace, then skip it.
    Quarantine,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_articles_dir")]
    pub articles_dir: String,
    #[serde(default)]
    pub malformed_policy: MalformedPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { articles_dir: default_articles_dir(), malformed_policy: MalformedPolicy::Skip }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Argon2 PHC string; takes precedence over `password` when set.
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default = "default_session_secret")]
    pub session_secret: String,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: i64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: Some(default_password()),
            password_hash: None,
            session_secret: default_session_secret(),
            session_ttl_hours: default_session_ttl(),
        }
    }
}

fn default_articles_dir() -> String { "articles".to_string() }
fn default_username() -> String { "admin".to_string() }
fn default_password() -> String { "password".to_string() }
fn default_session_secret() -> String { "supersecretkey".to_string() }
fn default_session_ttl() -> i64 { 12 }

/// Load from `CONFIG_PATH` (default `config.toml`); a missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !std::path::Path::new(&path).exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env_overrides(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from the environment. `lookup` abstracts `std::env::var`
    /// so tests do not have to mutate process-wide state. A value that does not
    /// parse is an error rather than silently falling back.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port
                .trim()
                .parse::<u16>()
                .map_err(|e| anyhow!("SERVER_PORT {port:?} is not a valid port: {e}"))?;
        }
        if let Some(dir) = lookup("ARTICLES_DIR") {
            self.storage.articles_dir = dir;
        }
        if let Some(user) = lookup("ADMIN_USERNAME") {
            self.admin.username = user;
        }
        if let Some(pass) = lookup("ADMIN_PASSWORD") {
            self.admin.password = Some(pass);
        }
        if let Some(hash) = lookup("ADMIN_PASSWORD_HASH") {
            self.admin.password_hash = Some(hash);
        }
        if let Some(secret) = lookup("SESSION_SECRET_KEY") {
            self.admin.session_secret = secret;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize()?;
        self.storage.validate()?;
        self.admin.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.articles_dir.trim().is_empty() {
            return Err(anyhow!("storage.articles_dir is empty"));
        }
        Ok(())
    }
}

impl AdminConfig {
    fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(anyhow!("admin.username is empty"));
        }
        let has_password = self.password.as_deref().is_some_and(|p| !p.is_empty());
        let has_hash = self.password_hash.as_deref().is_some_and(|h| !h.trim().is_empty());
        if !has_password && !has_hash {
            return Err(anyhow!("admin.password or admin.password_hash must be set"));
        }
        if self.session_secret.is_empty() {
            return Err(anyhow!("admin.session_secret is empty; set it in config.toml or SESSION_SECRET_KEY"));
        }
        if self.session_ttl_hours <= 0 {
            return Err(anyhow!("admin.session_ttl_hours must be a positive number of hours"));
        }
        Ok(())
    }
}
