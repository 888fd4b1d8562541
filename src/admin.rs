//! Admin operations: content editing and magic-link authentication.
//!
//! This is the layer an HTTP front end or the CLI talks to. It wires the
//! content store, token store, sessions, and rate limiter together and owns
//! the policies that span them:
//!
//! - a post must carry `title` and `date` front matter before it is saved
//! - a saved post triggers a regeneration, but a failed regeneration does
//!   not fail the save (the content is already on disk)
//! - a login link is only mailed when the client is inside its rate budget,
//!   and the attempt is recorded only after the mail actually went out
//! - token problems are reported to callers precisely but
//!   [`AdminError::user_message`] collapses them to one neutral phrase, so
//!   responses do not reveal whether a guessed token ever existed
//!
//! Mail delivery sits behind the [`LoginMailer`] seam; the core never opens
//! an SMTP connection itself.

use crate::config::BlogConfig;
use crate::datafile::{DataFileError, JsonDocument};
use crate::frontmatter;
use crate::generate;
use crate::naming;
use crate::ratelimit::RateLimiter;
use crate::session::SessionStore;
use crate::store::{ContentStore, PostSummary, StoreError};
use crate::token::{AuthError, TokenStore};
use log::{info, warn};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Invalid filename: {0}")]
    InvalidName(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Expired token")]
    ExpiredToken,
    #[error("Rate limited, retry in {retry_after}s")]
    RateLimited { retry_after: i64 },
    #[error("No admin email configured")]
    NotConfigured,
    #[error("Mail delivery failed: {0}")]
    Mail(String),
    #[error("Data error: {0}")]
    Data(#[from] DataFileError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for AdminError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(name) => AdminError::NotFound(name),
            StoreError::InvalidName(name) => AdminError::InvalidName(name),
            StoreError::DirectoryNotFound(path) => {
                AdminError::NotFound(path.display().to_string())
            }
            StoreError::Io(e) => AdminError::Io(e),
        }
    }
}

impl From<AuthError> for AdminError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken => AdminError::InvalidToken,
            AuthError::ExpiredToken => AdminError::ExpiredToken,
            AuthError::Data(e) => AdminError::Data(e),
        }
    }
}

impl AdminError {
    /// Message safe to show an unauthenticated visitor. Token failures are
    /// deliberately indistinguishable from each other.
    pub fn user_message(&self) -> String {
        match self {
            AdminError::InvalidToken | AdminError::ExpiredToken => {
                "Invalid or expired login link. Please request a new one.".to_string()
            }
            AdminError::RateLimited { retry_after } => {
                let minutes = (retry_after + 59) / 60;
                format!("Too many login requests. Try again in {minutes} minute(s).")
            }
            other => other.to_string(),
        }
    }
}

/// Result of saving a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Public URL of the published page; `None` for drafts.
    pub post_url: Option<String>,
}

/// Sends the magic-link mail. Implemented over SMTP by the HTTP front end
/// and by capturing fakes in tests.
pub trait LoginMailer {
    fn send_login_link(
        &self,
        to: &str,
        login_url: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub struct Admin {
    config: BlogConfig,
    store: ContentStore,
    tokens: TokenStore,
    sessions: SessionStore,
    limiter: RateLimiter,
}

impl Admin {
    pub fn new(config: BlogConfig) -> Self {
        let store = ContentStore::new(&config.content_dir);
        let tokens = TokenStore::new(JsonDocument::new(config.tokens_path()));
        let sessions = SessionStore::new(
            JsonDocument::new(config.sessions_path()),
            config.session_lifetime,
        );
        let limiter = RateLimiter::new(
            JsonDocument::new(config.rate_limits_path()),
            config.rate_limit.attempts,
            config.rate_limit.window,
        );
        Self {
            config,
            store,
            tokens,
            sessions,
            limiter,
        }
    }

    pub fn config(&self) -> &BlogConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    pub fn list_posts(&self) -> Result<Vec<PostSummary>, AdminError> {
        Ok(self.store.list()?)
    }

    pub fn read_post(&self, filename: &str) -> Result<String, AdminError> {
        Ok(self.store.read(filename)?)
    }

    /// Save a post and regenerate the site. The content must carry `title`
    /// and `date` front matter; nothing is written otherwise.
    pub fn write_post(&self, filename: &str, content: &str) -> Result<SaveOutcome, AdminError> {
        let (metadata, _) = frontmatter::parse(content);
        for required in ["title", "date"] {
            if metadata.get(required).map(String::as_str).unwrap_or("").is_empty() {
                return Err(AdminError::Validation(format!(
                    "front matter field '{required}' is required"
                )));
            }
        }

        self.store.write(filename, content)?;
        self.regenerate();

        let post_url = (!frontmatter::is_draft(&metadata)).then(|| {
            let slug = naming::parse_entry_name(stem(filename)).base;
            format!("{}/posts/{}.html", self.config.base_url_trimmed(), slug)
        });
        Ok(SaveOutcome { post_url })
    }

    /// Validate every post's front matter without touching the output.
    /// Returns one line per problem found; an empty list means all posts
    /// carry the required fields.
    pub fn check_content(&self) -> Result<Vec<String>, AdminError> {
        let mut problems = Vec::new();
        for post in self.store.list()? {
            let content = self.store.read(&post.filename)?;
            let (metadata, _) = frontmatter::parse(&content);
            for required in ["title", "date"] {
                if metadata.get(required).map(String::as_str).unwrap_or("").is_empty() {
                    problems.push(format!(
                        "{}: missing front matter field '{required}'",
                        post.filename
                    ));
                }
            }
        }
        Ok(problems)
    }

    /// Create an empty post file. Creating an existing file succeeds and
    /// leaves it alone. No regeneration: an empty file has nothing to show.
    pub fn create_post(&self, filename: &str) -> Result<(), AdminError> {
        self.store.create(filename)?;
        Ok(())
    }

    pub fn delete_post(&self, filename: &str) -> Result<(), AdminError> {
        self.store.delete(filename)?;
        self.remove_output(filename);
        self.regenerate();
        Ok(())
    }

    pub fn rename_post(&self, old_name: &str, new_name: &str) -> Result<(), AdminError> {
        self.store.rename(old_name, new_name)?;
        self.remove_output(old_name);
        self.regenerate();
        Ok(())
    }

    /// Regeneration after a content change is best effort. The saved file
    /// is the source of truth; a broken template should not lose an edit.
    fn regenerate(&self) {
        if let Err(e) = generate::generate(&self.config, false) {
            warn!("site regeneration failed: {e}");
        }
    }

    /// Drop the published page for a source file that no longer maps to it.
    fn remove_output(&self, filename: &str) {
        let slug = naming::parse_entry_name(stem(filename)).base;
        let out = self.config.output_dir.join("posts").join(format!("{slug}.html"));
        if out.exists()
            && let Err(e) = fs::remove_file(&out)
        {
            warn!("could not remove {}: {e}", out.display());
        }
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Mail a one-time login link to the configured admin address.
    ///
    /// `client_key` identifies the requester for rate limiting, normally
    /// the address from [`crate::ratelimit::client_ip`]. The attempt is
    /// recorded only after the mail went out, so a delivery failure does
    /// not burn part of the budget.
    pub fn request_login_link(
        &self,
        client_key: &str,
        mailer: &dyn LoginMailer,
    ) -> Result<(), AdminError> {
        if self.config.admin_email.trim().is_empty() {
            return Err(AdminError::NotConfigured);
        }

        let now = epoch_now();
        let decision = self.limiter.check(client_key, now)?;
        if !decision.allowed {
            return Err(AdminError::RateLimited {
                retry_after: (decision.reset_at - now).max(0),
            });
        }

        let (_, login_url) = self.issue_login_link()?;
        mailer
            .send_login_link(&self.config.admin_email, &login_url)
            .map_err(|e| AdminError::Mail(e.to_string()))?;
        self.limiter.record(client_key, now)?;
        info!("login link sent to {}", self.config.admin_email);
        Ok(())
    }

    /// Issue a login token directly, bypassing mail and rate limiting.
    /// Backs the `login` CLI command for operators with shell access.
    pub fn issue_login_link(&self) -> Result<(String, String), AdminError> {
        let token = self.tokens.issue(epoch_now(), self.config.token_ttl)?;
        let url = format!(
            "{}/admin/login?token={token}",
            self.config.base_url_trimmed()
        );
        Ok((token, url))
    }

    /// Redeem a login token and open a session. The token is consumed
    /// whatever the outcome.
    pub fn verify_login_token(&self, token: &str) -> Result<String, AdminError> {
        let now = epoch_now();
        self.tokens.verify(token, now)?;
        Ok(self.sessions.create(now)?)
    }

    pub fn check_session(&self, session_token: &str) -> Result<bool, AdminError> {
        Ok(self.sessions.check(session_token, epoch_now())?)
    }

    pub fn logout(&self, session_token: &str) -> Result<(), AdminError> {
        Ok(self.sessions.destroy(session_token)?)
    }
}

fn stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

fn epoch_now() -> i64 {
    chrono::Utc::now().timestamp()
}
