use std::collections::HashMap;
use std::future::Future;
use std::sync::{PoisonError, RwLock, Weak};

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::models::{CountryRecord, RawCountry};
use crate::utils::fetch_json;

/// The single error kind of the data path. Logged once at the load site and
/// never surfaced to the page.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadFailure {
    #[error("request to country service failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("country service answered with status {0}")]
    Status(u16),

    #[error("malformed country payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Anything that can hand over the full country list in one go.
pub trait CountrySource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<RawCountry>, DataLoadFailure>> + Send;
}

pub struct HttpCountrySource {
    client: Client,
    url: String,
}

impl HttpCountrySource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

impl CountrySource for HttpCountrySource {
    async fn fetch(&self) -> Result<Vec<RawCountry>, DataLoadFailure> {
        fetch_json(&self.client, &self.url).await
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Pending,
    Ready,
    Failed,
}

#[derive(Default)]
struct Catalog {
    records: Vec<CountryRecord>,
    by_code: HashMap<String, usize>,
}

impl Catalog {
    fn build(raw: Vec<RawCountry>) -> Self {
        let mut catalog = Catalog::default();
        for entry in raw {
            let record = match CountryRecord::from_raw(entry) {
                Ok(record) => record,
                Err(e) => {
                    warn!("skipping country entry: {}", e);
                    continue;
                }
            };
            if catalog.by_code.contains_key(&record.code) {
                warn!("duplicate country code {}, keeping first", record.code);
                continue;
            }
            catalog.by_code.insert(record.code.clone(), catalog.records.len());
            catalog.records.push(record);
        }
        catalog
    }
}

struct Inner {
    catalog: Catalog,
    status: LoadStatus,
}

/// The country collection. Empty until a load succeeds, read-only afterwards.
pub struct CountryRepository {
    inner: RwLock<Inner>,
}

impl Default for CountryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl CountryRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                catalog: Catalog::default(),
                status: LoadStatus::Pending,
            }),
        }
    }

    /// Fetches the full list once and applies it. Only a weak reference is
    /// held across the fetch; if the repository is gone by the time the answer
    /// arrives, the answer is discarded.
    pub async fn load<S: CountrySource>(repository: Weak<Self>, source: &S) {
        let outcome = source.fetch().await;
        match repository.upgrade() {
            Some(repository) => repository.complete_load(outcome),
            None => debug!("country repository dropped before countries arrived, discarding"),
        }
    }

    /// Success replaces the collection wholesale; failure leaves it untouched
    /// and reports to the diagnostics target.
    fn complete_load(&self, outcome: Result<Vec<RawCountry>, DataLoadFailure>) {
        match outcome {
            Ok(raw) => {
                let received = raw.len();
                let catalog = Catalog::build(raw);
                let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
                info!("loaded {} countries ({} received)", catalog.records.len(), received);
                inner.catalog = catalog;
                inner.status = LoadStatus::Ready;
            }
            Err(e) => {
                error!(target: "diagnostics", kind = "DataLoadFailure", "error fetching countries: {}", e);
                self.inner.write().unwrap_or_else(PoisonError::into_inner).status = LoadStatus::Failed;
            }
        }
    }

    pub fn find_by_code(&self, code: &str) -> Option<CountryRecord> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .catalog
            .by_code
            .get(code)
            .map(|&i| inner.catalog.records[i].clone())
    }

    pub fn with_records<R>(&self, f: impl FnOnce(&[CountryRecord]) -> R) -> R {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&inner.catalog.records)
    }

    pub fn status(&self) -> LoadStatus {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).status
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.with_records(|records| records.len())
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
