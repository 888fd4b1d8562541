//! Blog configuration.
//!
//! Handles loading and validating `penpress.toml`. Every field has an
//! explicit default so a config file only needs to override the values it
//! cares about. Unknown keys are rejected to catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_name = "Penpress"
//! base_url = "http://localhost"       # Public URL of the site, no trailing slash
//! language = "en"                     # html lang attribute
//! admin_email = ""                    # Recipient of magic-link logins
//! allowed_domain = ""                 # Origin allowed by the admin HTTP layer
//! date_format = "%Y-%m-%d"            # chrono format string for displayed dates
//!
//! content_dir = "content/posts"       # Markdown articles
//! links_dir = "content/links"         # External-link stubs (.txt)
//! output_dir = "public"               # Generated site
//! data_dir = "data"                   # Tokens, sessions, rate-limit records
//! template = "theme/main.html"        # Page template (provisioned on first run)
//!
//! session_lifetime = 3600             # Seconds of inactivity before logout
//! token_ttl = 3600                    # Magic-link validity in seconds
//!
//! [rate_limit]
//! attempts = 3                        # Login requests allowed per window
//! window = 3600                       # Window length in seconds
//!
//! [smtp]                              # Consumed by the mail delivery layer
//! host = "localhost"
//! port = 25
//! # encryption = "tls"
//! # username = "..."
//! # password = "..."
//! # from_name = "My Blog"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Blog configuration loaded from `penpress.toml`.
///
/// All fields have defaults; user config files are sparse overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// Site name shown in the header and page titles.
    pub site_name: String,
    /// Public base URL of the generated site, without a trailing slash.
    pub base_url: String,
    /// Value of the `lang` attribute on generated pages.
    pub language: String,
    /// Address that receives magic-link login mails.
    pub admin_email: String,
    /// Origin the admin HTTP layer accepts; the core only carries it.
    pub allowed_domain: String,
    /// chrono format string for dates shown on the index.
    pub date_format: String,
    /// Directory of Markdown articles.
    pub content_dir: PathBuf,
    /// Directory of external-link stub files.
    pub links_dir: PathBuf,
    /// Directory the generated site is written to.
    pub output_dir: PathBuf,
    /// Directory for persisted auth and rate-limit state.
    pub data_dir: PathBuf,
    /// Page template path; provisioned from the built-in default if absent.
    pub template: PathBuf,
    /// Sliding session lifetime in seconds.
    pub session_lifetime: i64,
    /// Login token validity in seconds.
    pub token_ttl: i64,
    /// Login request throttling.
    pub rate_limit: RateLimitConfig,
    /// SMTP settings, passed through to the mail delivery layer.
    pub smtp: SmtpConfig,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            site_name: "Penpress".to_string(),
            base_url: "http://localhost".to_string(),
            language: "en".to_string(),
            admin_email: String::new(),
            allowed_domain: String::new(),
            date_format: "%Y-%m-%d".to_string(),
            content_dir: PathBuf::from("content/posts"),
            links_dir: PathBuf::from("content/links"),
            output_dir: PathBuf::from("public"),
            data_dir: PathBuf::from("data"),
            template: PathBuf::from("theme/main.html"),
            session_lifetime: 3600,
            token_ttl: 3600,
            rate_limit: RateLimitConfig::default(),
            smtp: SmtpConfig::default(),
        }
    }
}

/// Throttle settings for login-link requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Requests allowed per client within the window.
    pub attempts: u32,
    /// Sliding window length in seconds.
    pub window: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            window: 3600,
        }
    }
}

/// SMTP transport settings. The core never opens a connection itself; these
/// are parsed and handed to whatever implements the mail seam.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub encryption: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_name: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 25,
            encryption: None,
            username: None,
            password: None,
            from_name: None,
        }
    }
}

impl BlogConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("base_url must not be empty".into()));
        }
        if self.rate_limit.attempts == 0 {
            return Err(ConfigError::Validation(
                "rate_limit.attempts must be at least 1".into(),
            ));
        }
        if self.rate_limit.window <= 0 {
            return Err(ConfigError::Validation(
                "rate_limit.window must be positive".into(),
            ));
        }
        if self.session_lifetime <= 0 {
            return Err(ConfigError::Validation(
                "session_lifetime must be positive".into(),
            ));
        }
        if self.token_ttl <= 0 {
            return Err(ConfigError::Validation("token_ttl must be positive".into()));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn tokens_path(&self) -> PathBuf {
        self.data_dir.join("tokens.json")
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.data_dir.join("sessions.json")
    }

    pub fn rate_limits_path(&self) -> PathBuf {
        self.data_dir.join("rate_limits.json")
    }
}

/// A stock `penpress.toml` with every option documented.
pub fn stock_config_toml() -> &'static str {
    r#"# penpress configuration. All options are optional - defaults shown.

site_name = "Penpress"
base_url = "http://localhost"       # Public URL of the site, no trailing slash
language = "en"                     # html lang attribute
admin_email = ""                    # Recipient of magic-link logins
allowed_domain = ""                 # Origin allowed by the admin HTTP layer
date_format = "%Y-%m-%d"            # Format for dates shown on the index

content_dir = "content/posts"       # Markdown articles
links_dir = "content/links"         # External-link stubs (.txt)
output_dir = "public"               # Generated site
data_dir = "data"                   # Tokens, sessions, rate-limit records
template = "theme/main.html"        # Page template (provisioned on first run)

session_lifetime = 3600             # Seconds of inactivity before logout
token_ttl = 3600                    # Magic-link validity in seconds

[rate_limit]
attempts = 3                        # Login requests allowed per window
window = 3600                       # Window length in seconds

[smtp]                              # Passed through to the mail delivery layer
host = "localhost"
port = 25
# encryption = "tls"
# username = ""
# password = ""
# from_name = ""
"#
}
