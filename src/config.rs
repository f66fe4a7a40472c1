//! Configuration management for booksum using the prefer crate.
//!
//! Settings are resolved in order: built-in defaults, then a config file
//! (TOML, YAML or JSON; given with `--config` or discovered by prefer), then
//! environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::llm::LlmConfig;
use crate::repository::pool::{is_postgres_url, DEFAULT_POOL_SIZE};
use crate::repository::{DbContext, DbError};

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "book_summaries.db";

/// Default maximum upload body size (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Default sample text used by the development seeding route.
pub const DEFAULT_SAMPLE_TEXT_PATH: &str = "atomic_habits.txt";

/// Development secret used when `SESSION_SECRET` is not set.
pub const DEV_SESSION_SECRET: &str = "booksum-dev-secret";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename inside `data_dir`.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    pub database_url: Option<String>,
    /// Secret for signing session data.
    pub session_secret: String,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
    /// Maximum pooled PostgreSQL connections.
    pub pool_size: usize,
    /// Text file seeded by `/test_summary`.
    pub sample_text_path: PathBuf,
    /// Register development-only routes.
    pub dev_routes: bool,
    /// Summary generation settings.
    pub llm: LlmConfig,
}

impl Default for Settings {
    fn default() -> Self {
        // Documents dir -> Home dir -> Current dir
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("booksum");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
            session_secret: DEV_SESSION_SECRET.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            pool_size: DEFAULT_POOL_SIZE,
            sample_text_path: PathBuf::from(DEFAULT_SAMPLE_TEXT_PATH),
            dev_routes: cfg!(debug_assertions),
            llm: LlmConfig::base_default(),
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        if let Some(ref url) = self.database_url {
            url.clone()
        } else {
            format!("sqlite:{}", self.database_path().display())
        }
    }

    /// Check if using PostgreSQL (vs SQLite).
    pub fn is_postgres(&self) -> bool {
        self.database_url
            .as_ref()
            .is_some_and(|url| is_postgres_url(url))
    }

    /// Get the full path to the default SQLite database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Whether the built-in development secret is in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.session_secret == DEV_SESSION_SECRET
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create data directory '{}': {}",
                    self.data_dir.display(),
                    e
                ),
            )
        })
    }

    pub fn create_db_context(&self) -> Result<DbContext, DbError> {
        DbContext::from_url(&self.database_url(), self.pool_size)
    }

    /// Apply environment variable overrides.
    ///
    /// - `DATABASE_URL`, `SESSION_SECRET`, `MAX_UPLOAD_BYTES`,
    ///   `DATABASE_POOL_SIZE`, `SAMPLE_TEXT_PATH`, `BOOKSUM_DEV_ROUTES`
    /// - `LLM_*` and provider key variables (see [`LlmConfig::with_overrides_from`])
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATABASE_URL") {
            tracing::debug!(
                "Using DATABASE_URL from environment: {}",
                crate::repository::redact_url_password(&url)
            );
            self.database_url = Some(url);
        }
        if let Some(secret) = lookup("SESSION_SECRET") {
            self.session_secret = secret;
        }
        if let Some(n) = lookup("MAX_UPLOAD_BYTES").and_then(|v| v.parse().ok()) {
            self.max_upload_bytes = n;
        }
        if let Some(n) = lookup("DATABASE_POOL_SIZE").and_then(|v| v.parse().ok()) {
            self.pool_size = n;
        }
        if let Some(path) = lookup("SAMPLE_TEXT_PATH") {
            self.sample_text_path = PathBuf::from(path);
        }
        if let Some(flag) = lookup("BOOKSUM_DEV_ROUTES") {
            self.dev_routes = parse_flag(&flag);
        }
        self.llm = self.llm.clone().with_overrides_from(&lookup);
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Config file contents. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_text_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_routes: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmConfig>,
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover a `booksum.*` config file with prefer, or fall back to defaults.
    pub async fn load() -> Self {
        match prefer::load("booksum").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            // No config file found
            Err(_) => Self::default(),
        }
    }

    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(ref url) = self.database_url {
            settings.database_url = Some(url.clone());
        }
        if let Some(ref secret) = self.session_secret {
            settings.session_secret = secret.clone();
        }
        if let Some(n) = self.max_upload_bytes {
            settings.max_upload_bytes = n;
        }
        if let Some(n) = self.pool_size {
            settings.pool_size = n;
        }
        if let Some(ref path) = self.sample_text_path {
            settings.sample_text_path = self.resolve_path(path, base_dir);
        }
        if let Some(flag) = self.dev_routes {
            settings.dev_routes = flag;
        }
        if let Some(ref llm) = self.llm {
            settings.llm = llm.clone();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file (`--config`).
    pub config_path: Option<PathBuf>,
    /// Resolve relative config paths against the working directory.
    pub use_cwd: bool,
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await.unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            Config::default()
        }),
        None => Config::load().await,
    };

    let mut settings = Settings::default();

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = if options.use_cwd {
        cwd
    } else {
        config.base_dir().unwrap_or(cwd)
    };

    config.apply_to_settings(&mut settings, &base_dir);
    settings.apply_env_overrides();

    (settings, config)
}
