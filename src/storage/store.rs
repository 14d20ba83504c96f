//! Set-merging URL store
//!
//! The store is the only state that outlives a discovery run. Each strategy
//! contributes its full result under its own name; the corpus is the union of
//! everything ever merged and never shrinks.

use crate::storage::{
    CorpusDocument, CorpusStorage, JsonFileStorage, PhaseRecord, StoreError, StoreResult,
    SCHEMA_VERSION,
};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

const DESCRIPTION: &str = "Unified store of all discovered URLs with set-based deduplication";

/// What one merge contributed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Distinct URLs the strategy reported
    pub total_found: usize,

    /// URLs the corpus did not contain before this merge
    pub new_urls: BTreeSet<String>,
}

impl MergeOutcome {
    pub fn new_unique(&self) -> usize {
        self.new_urls.len()
    }
}

/// Persistent corpus keyed by strategy name
///
/// Merges must be serialized by the caller; the store takes `&mut self` and
/// is not meant to be shared between concurrently running strategies.
#[derive(Debug)]
pub struct UrlStore<S: CorpusStorage = JsonFileStorage> {
    storage: S,
    base_domain: String,
    created_at: String,
    updated_at: String,
    phases: BTreeMap<String, PhaseRecord>,
    all_unique: BTreeSet<String>,
}

impl UrlStore<JsonFileStorage> {
    /// Opens (or starts) the corpus file at `path`
    pub fn open_path(path: impl AsRef<Path>, base_domain: &str) -> StoreResult<Self> {
        Self::open(JsonFileStorage::new(path.as_ref()), base_domain)
    }
}

impl<S: CorpusStorage> UrlStore<S> {
    /// Loads the persisted corpus for `base_domain`
    ///
    /// A backend with nothing stored yields an empty corpus. Nothing is
    /// written until the first merge.
    ///
    /// # Errors
    ///
    /// * `StoreError::DomainMismatch` - The stored corpus is for another site
    /// * `StoreError::Json` / `StoreError::Io` - The backend could not be read
    pub fn open(storage: S, base_domain: &str) -> StoreResult<Self> {
        let now = Utc::now().to_rfc3339();

        let Some(doc) = storage.load()? else {
            tracing::info!("Starting a new corpus for {}", base_domain);
            return Ok(Self {
                storage,
                base_domain: base_domain.to_string(),
                created_at: now.clone(),
                updated_at: now,
                phases: BTreeMap::new(),
                all_unique: BTreeSet::new(),
            });
        };

        if !doc.base_domain.eq_ignore_ascii_case(base_domain) {
            return Err(StoreError::DomainMismatch {
                expected: base_domain.to_string(),
                found: doc.base_domain,
            });
        }

        let mut all_unique: BTreeSet<String> = doc.all_unique_urls.into_iter().collect();
        for phase in doc.phases.values() {
            all_unique.extend(phase.urls.iter().cloned());
        }

        tracing::info!(
            "Loaded corpus for {}: {} phase(s), {} unique URLs",
            doc.base_domain,
            doc.phases.len(),
            all_unique.len()
        );

        Ok(Self {
            storage,
            base_domain: doc.base_domain,
            created_at: if doc.created_at_utc.is_empty() {
                now
            } else {
                doc.created_at_utc
            },
            updated_at: doc.updated_at_utc,
            phases: doc.phases,
            all_unique,
        })
    }

    /// Merges one strategy's result and persists the whole corpus
    ///
    /// The strategy's record is replaced by `urls` in full; the corpus only
    /// grows. An empty `urls` still records the strategy run.
    ///
    /// # Arguments
    ///
    /// * `strategy` - Strategy name, e.g. `"robots"` or `"recursive-crawl"`
    /// * `urls` - Everything the strategy found
    /// * `execution_time` - Seconds the strategy took
    ///
    /// # Returns
    ///
    /// How many URLs the strategy found and which of them were new
    ///
    /// # Errors
    ///
    /// If the backend cannot save, the in-memory corpus is left as it was
    /// before the call, so the same merge can be retried.
    pub fn merge<I>(&mut self, strategy: &str, urls: I, execution_time: f64) -> StoreResult<MergeOutcome>
    where
        I: IntoIterator<Item = String>,
    {
        let urls: BTreeSet<String> = urls.into_iter().collect();
        let new_urls: BTreeSet<String> = urls.difference(&self.all_unique).cloned().collect();
        self.all_unique.extend(new_urls.iter().cloned());

        let now = Utc::now().to_rfc3339();
        let previous_phase = self.phases.insert(
            strategy.to_string(),
            PhaseRecord {
                execution_time,
                raw_count: urls.len(),
                timestamp: now.clone(),
                urls: urls.iter().cloned().collect(),
            },
        );
        let previous_updated_at = std::mem::replace(&mut self.updated_at, now);

        if let Err(e) = self.persist() {
            tracing::warn!("Failed to save '{}' results, corpus unchanged: {}", strategy, e);
            for url in &new_urls {
                self.all_unique.remove(url);
            }
            match previous_phase {
                Some(record) => {
                    self.phases.insert(strategy.to_string(), record);
                }
                None => {
                    self.phases.remove(strategy);
                }
            }
            self.updated_at = previous_updated_at;
            return Err(e);
        }

        tracing::info!(
            "Merged '{}': {} found, {} new, {} total unique",
            strategy,
            urls.len(),
            new_urls.len(),
            self.all_unique.len()
        );

        Ok(MergeOutcome {
            total_found: urls.len(),
            new_urls,
        })
    }

    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    /// Every URL ever merged
    pub fn all_unique(&self) -> &BTreeSet<String> {
        &self.all_unique
    }

    pub fn total_unique(&self) -> usize {
        self.all_unique.len()
    }

    pub fn phases(&self) -> &BTreeMap<String, PhaseRecord> {
        &self.phases
    }

    pub fn phase(&self, strategy: &str) -> Option<&PhaseRecord> {
        self.phases.get(strategy)
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    /// Builds the document that would be persisted
    pub fn to_document(&self) -> CorpusDocument {
        CorpusDocument {
            schema_version: SCHEMA_VERSION.to_string(),
            base_domain: self.base_domain.clone(),
            description: DESCRIPTION.to_string(),
            created_at_utc: self.created_at.clone(),
            phases: self.phases.clone(),
            total_unique_urls: self.all_unique.len(),
            updated_at_utc: self.updated_at.clone(),
            all_unique_urls: self.all_unique.iter().cloned().collect(),
        }
    }

    fn persist(&mut self) -> StoreResult<()> {
        let document = self.to_document();
        self.storage.save(&document)
    }
}
