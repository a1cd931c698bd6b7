//! Backend selection for the ledger store, read from the environment.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::repository::{CatalogRepository, LedgerRepository, Storage, StorageError};
use crate::sheets::{DEFAULT_TIMEOUT, SheetsClient, SheetsConfig};
use crate::sqlite::SqliteInitError;

/// Ledger location used when `LIFTLOG_LEDGER_URL` is unset.
pub const DEFAULT_LEDGER_URL: &str = "sqlite:liftlog.sqlite3";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unsupported ledger url (expected sqlite: or http(s)://): {raw}")]
    UnsupportedUrl { raw: String },
    #[error("invalid LIFTLOG_TIMEOUT_SECS value: {raw}")]
    InvalidTimeout { raw: String },
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerBackend {
    Sqlite { url: String },
    Sheets { base_url: String },
}

impl LedgerBackend {
    /// Pick the backend from the scheme of `raw`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnsupportedUrl` for any other scheme.
    pub fn from_url(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.starts_with("sqlite:") {
            Ok(Self::Sqlite {
                url: trimmed.to_owned(),
            })
        } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Ok(Self::Sheets {
                base_url: trimmed.to_owned(),
            })
        } else {
            Err(ConfigError::UnsupportedUrl {
                raw: raw.to_owned(),
            })
        }
    }
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: LedgerBackend,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl StorageConfig {
    /// Read `LIFTLOG_LEDGER_URL`, `LIFTLOG_SHEETS_TOKEN` and `LIFTLOG_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the url scheme or timeout is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`StorageConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the url scheme or timeout is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup("LIFTLOG_LEDGER_URL").unwrap_or_else(|| DEFAULT_LEDGER_URL.into());
        let backend = LedgerBackend::from_url(&url)?;
        let token = lookup("LIFTLOG_SHEETS_TOKEN").filter(|t| !t.trim().is_empty());
        let timeout = match lookup("LIFTLOG_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidTimeout { raw: raw.clone() })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidTimeout { raw });
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };
        Ok(Self {
            backend,
            token,
            timeout,
        })
    }
}

impl Storage {
    /// Build the repositories selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the backend cannot be opened.
    pub async fn connect(config: &StorageConfig) -> Result<Self, ConfigError> {
        match &config.backend {
            LedgerBackend::Sqlite { url } => {
                info!(url = %url, "opening sqlite ledger");
                Ok(Self::sqlite(url).await?)
            }
            LedgerBackend::Sheets { base_url } => {
                info!(base_url = %base_url, timeout = ?config.timeout, "using spreadsheet ledger");
                let client = SheetsClient::new(SheetsConfig {
                    base_url: base_url.clone(),
                    token: config.token.clone(),
                    timeout: config.timeout,
                })?;
                let ledger: Arc<dyn LedgerRepository> = Arc::new(client.clone());
                let catalog: Arc<dyn CatalogRepository> = Arc::new(client);
                Ok(Self { ledger, catalog })
            }
        }
    }
}
