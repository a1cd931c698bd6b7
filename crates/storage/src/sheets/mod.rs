//! Reqwest-backed adapter for the shared spreadsheet store.
//!
//! The store exposes each named table at `{base_url}/tables/{name}`: `GET` returns
//! the whole table and `PUT` replaces it. Nothing finer-grained exists, so
//! `overwrite_if_unchanged` falls back to the trait's read-compare-write.

use std::time::Duration;

use async_trait::async_trait;
use liftlog_core::model::{ExerciseCatalog, Ledger};
use reqwest::Client;
use tracing::debug;

use crate::repository::{
    CatalogRepository, DATA_TABLE, EXERCISES_TABLE, LedgerRepository, StorageError,
};

mod dto;

pub use dto::TableDto;

/// Default bound on a single request to the spreadsheet store.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct SheetsConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl SheetsConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl SheetsClient {
    /// Build a client whose every request is bounded by `config.timeout`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connectivity` if the HTTP client cannot be constructed.
    pub fn new(config: SheetsConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(map_transport_error)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            token: config.token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/tables/{table}", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch_table(&self, table: &str) -> Result<TableDto, StorageError> {
        let request = self.authorize(self.client.get(self.table_url(table)));
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Connectivity(format!(
                "reading {table} failed with status {status}"
            )));
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        let dto: TableDto = serde_json::from_slice(&body).map_err(|e| {
            StorageError::Schema(format!("invalid {table} table payload: {e}"))
        })?;
        debug!(table, rows = dto.rows.len(), "fetched remote table");
        Ok(dto)
    }

    async fn put_table(&self, table: &str, dto: &TableDto) -> Result<(), StorageError> {
        let request = self.authorize(self.client.put(self.table_url(table)).json(dto));
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Connectivity(format!(
                "writing {table} failed with status {status}"
            )));
        }
        debug!(table, rows = dto.rows.len(), "overwrote remote table");
        Ok(())
    }
}

fn map_transport_error(error: reqwest::Error) -> StorageError {
    if error.is_timeout() {
        StorageError::Connectivity(format!("request timed out: {error}"))
    } else {
        StorageError::Connectivity(error.to_string())
    }
}

#[async_trait]
impl LedgerRepository for SheetsClient {
    async fn read_all(&self) -> Result<Ledger, StorageError> {
        self.fetch_table(DATA_TABLE).await?.into_ledger()
    }

    async fn overwrite_all(&self, ledger: &Ledger) -> Result<(), StorageError> {
        self.put_table(DATA_TABLE, &TableDto::from_ledger(ledger))
            .await
    }
}

#[async_trait]
impl CatalogRepository for SheetsClient {
    async fn list_exercises(&self) -> Result<ExerciseCatalog, StorageError> {
        self.fetch_table(EXERCISES_TABLE).await?.into_catalog()
    }

    async fn replace_exercises(&self, catalog: &ExerciseCatalog) -> Result<(), StorageError> {
        self.put_table(EXERCISES_TABLE, &TableDto::from_catalog(catalog))
            .await
    }
}
