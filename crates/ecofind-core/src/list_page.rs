//! Page-level owner of one fetched collection

use crate::{
    listing::{process, FilterState, ListConfig, PageResult, Record},
    loader::LoadOutcome,
    Result,
};
use serde::Serialize;
use tracing::{debug, warn};

/// Where the collection is in its fetch lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "camelCase")]
pub enum LoadState {
    /// Nothing requested yet
    Idle,
    /// A fetch is in flight
    Loading,
    /// The collection is populated
    Ready,
    /// The last fetch failed
    Failed(String),
}

/// Raw collection plus the UI state rendering it
#[derive(Debug, Clone)]
pub struct ListPage<R> {
    records: Vec<R>,
    filter: FilterState,
    config: ListConfig,
    load: LoadState,
}

impl<R: Record> ListPage<R> {
    /// Empty page rendering through `config`, starting from `filter`
    #[must_use]
    pub const fn new(config: ListConfig, filter: FilterState) -> Self {
        Self {
            records: Vec::new(),
            filter,
            config,
            load: LoadState::Idle,
        }
    }

    /// Raw records in fetch order
    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Current filter state
    #[must_use]
    pub const fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Mutable filter state
    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.filter
    }

    /// Listing configuration
    #[must_use]
    pub const fn config(&self) -> &ListConfig {
        &self.config
    }

    /// Fetch lifecycle state
    #[must_use]
    pub const fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Whether a usable collection is held
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.load, LoadState::Ready)
    }

    /// Mark a fetch as started
    pub fn begin_loading(&mut self) {
        self.load = LoadState::Loading;
    }

    /// Apply the result of a fetch; cancelled results leave the page untouched
    pub fn apply<E: std::fmt::Display>(&mut self, outcome: LoadOutcome<std::result::Result<Vec<R>, E>>) {
        match outcome {
            LoadOutcome::Loaded(Ok(records)) => {
                debug!(count = records.len(), "List loaded");
                self.records = records;
                self.load = LoadState::Ready;
                let total_pages = self.records.len().div_ceil(self.config.page_size().max(1));
                self.filter.clamp_page(total_pages);
            }
            LoadOutcome::Loaded(Err(err)) => {
                warn!(error = %err, "List load failed");
                self.records.clear();
                self.load = LoadState::Failed(err.to_string());
            }
            LoadOutcome::Cancelled => {}
        }
    }

    /// Drop the collection and return to `Idle`
    pub fn clear(&mut self) {
        self.records.clear();
        self.load = LoadState::Idle;
    }

    /// Run the list processor, pulling an out-of-range page back first
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] for an unusable configuration.
    pub fn page(&mut self) -> Result<PageResult<'_, R>> {
        let total_pages = process(&self.records, &self.filter, &self.config)?.total_pages;
        self.filter.clamp_page(total_pages);
        process(&self.records, &self.filter, &self.config)
    }

    /// Record with the given id
    #[must_use]
    pub fn get(&self, id: &R::Id) -> Option<&R> {
        self.records.iter().find(|r| r.id() == *id)
    }

    /// Remove a record after a successful moderation action
    pub fn remove(&mut self, id: &R::Id) -> Option<R> {
        let index = self.records.iter().position(|r| r.id() == *id)?;
        Some(self.records.remove(index))
    }

    /// Update a record in place; returns whether it was found
    pub fn update(&mut self, id: &R::Id, apply: impl FnOnce(&mut R)) -> bool {
        match self.records.iter_mut().find(|r| r.id() == *id) {
            Some(record) => {
                apply(record);
                true
            }
            None => false,
        }
    }
}
