//! Where collected leads go

use crate::types::Lead;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Result of handing a lead to a sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SubmissionOutcome {
    /// The receiver accepted the lead
    Accepted,
    /// The receiver answered but refused the lead
    Rejected {
        /// Receiver-reported reason
        reason: String,
    },
    /// The receiver could not be reached or answered with an unreadable body
    Failed {
        /// Transport or decoding error text
        error: String,
    },
}

impl SubmissionOutcome {
    /// Whether the lead was accepted
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Receiver of collected leads
///
/// Implementations never fail: every problem is folded into a
/// [`SubmissionOutcome`] so the conversation can report it.
#[async_trait]
pub trait LeadSink: Send + Sync {
    /// Deliver one lead
    async fn submit(&self, lead: &Lead) -> SubmissionOutcome;
}

/// Leads a [`MemorySink`] keeps unless told otherwise
pub const DEFAULT_LEAD_CAPACITY: usize = 100;

/// In-memory sink answering with a fixed outcome and remembering the most
/// recent leads; the oldest lead is dropped once `capacity` is reached
#[derive(Debug)]
pub struct MemorySink {
    outcome: SubmissionOutcome,
    capacity: usize,
    received: Mutex<VecDeque<Lead>>,
}

impl MemorySink {
    /// Sink answering every submission with `outcome`
    #[must_use]
    pub const fn new(outcome: SubmissionOutcome) -> Self {
        Self::with_capacity(outcome, DEFAULT_LEAD_CAPACITY)
    }

    /// Sink answering with `outcome` and keeping at most `capacity` leads
    #[must_use]
    pub const fn with_capacity(outcome: SubmissionOutcome, capacity: usize) -> Self {
        Self {
            outcome,
            capacity,
            received: Mutex::new(VecDeque::new()),
        }
    }

    /// Sink accepting everything
    #[must_use]
    pub const fn accepting() -> Self {
        Self::new(SubmissionOutcome::Accepted)
    }

    /// Leads still held, oldest first
    #[must_use]
    pub fn received(&self) -> Vec<Lead> {
        self.received.lock().iter().cloned().collect()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::accepting()
    }
}

#[async_trait]
impl LeadSink for MemorySink {
    async fn submit(&self, lead: &Lead) -> SubmissionOutcome {
        if self.capacity > 0 {
            let mut leads = self.received.lock();
            while leads.len() >= self.capacity {
                leads.pop_front();
            }
            leads.push_back(lead.clone());
        }
        tracing::info!(company = %lead.company_name, "Lead recorded in memory");
        self.outcome.clone()
    }
}
