use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use geoquiz_types::models::AttributionMode;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "your-secret-key-change-in-production",
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

/// Session tokens live at most a year.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub images_dir: PathBuf,
    pub legacy_path: PathBuf,
    pub mode: AttributionMode,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let mode: AttributionMode = var("GEOQUIZ_MODE", "authenticated")
            .parse()
            .map_err(anyhow::Error::msg)
            .context("GEOQUIZ_MODE")?;

        let jwt_secret = lookup("GEOQUIZ_JWT_SECRET").unwrap_or_default();
        if mode == AttributionMode::Authenticated
            && (jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()))
        {
            bail!("GEOQUIZ_JWT_SECRET is unset or still a placeholder; set it in your .env file");
        }

        let port: u16 = var("GEOQUIZ_PORT", "3001")
            .parse()
            .context("GEOQUIZ_PORT must be a port number")?;
        let token_ttl_hours: i64 = var("GEOQUIZ_TOKEN_TTL_HOURS", "24")
            .parse()
            .context("GEOQUIZ_TOKEN_TTL_HOURS must be a whole number of hours")?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            bail!("GEOQUIZ_TOKEN_TTL_HOURS must be between 1 and {MAX_TOKEN_TTL_HOURS}");
        }
        let token_ttl = chrono::Duration::try_hours(token_ttl_hours)
            .context("GEOQUIZ_TOKEN_TTL_HOURS is out of range")?;

        let max_upload_mb: usize = var("GEOQUIZ_MAX_UPLOAD_MB", "50")
            .parse()
            .context("GEOQUIZ_MAX_UPLOAD_MB must be a whole number")?;
        if max_upload_mb == 0 {
            bail!("GEOQUIZ_MAX_UPLOAD_MB must be at least 1");
        }
        let max_upload_bytes = max_upload_mb
            .checked_mul(1024 * 1024)
            .context("GEOQUIZ_MAX_UPLOAD_MB is too large")?;

        Ok(Self {
            host: var("GEOQUIZ_HOST", "0.0.0.0"),
            port,
            db_path: var("GEOQUIZ_DB_PATH", "quiz.db").into(),
            images_dir: var("GEOQUIZ_IMAGES_DIR", "./images").into(),
            legacy_path: var("GEOQUIZ_LEGACY_PATH", "photos.json").into(),
            mode,
            jwt_secret,
            token_ttl,
            max_upload_bytes,
        })
    }
}
