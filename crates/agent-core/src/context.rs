//! Conversation Context
//!
//! Scratchpad owned by one conversation. The rule-based engine records the
//! latest utterance here and parks a discount request while the product it
//! names is looked up.

use serde::{Deserialize, Serialize};

/// A discount computation waiting for a catalog listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingDiscount {
    /// Discount in percent (15.0 means 15%)
    pub discount_percent: f64,

    /// Lower-cased product name fragment to look up
    pub product_name: String,
}

/// Per-conversation context store
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    last_query: Option<String>,
    pending_discount: Option<PendingDiscount>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent utterance
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Overwrite the most recent utterance
    pub fn set_last_query(&mut self, query: impl Into<String>) {
        self.last_query = Some(query.into());
    }

    /// Park a discount request; an existing one is replaced
    pub fn set_pending_discount(&mut self, pending: PendingDiscount) {
        if let Some(previous) = self.pending_discount.replace(pending) {
            tracing::debug!(
                product = %previous.product_name,
                "Replacing unconsumed pending discount"
            );
        }
    }

    /// Peek at the pending discount
    pub fn pending_discount(&self) -> Option<&PendingDiscount> {
        self.pending_discount.as_ref()
    }

    /// Remove and return the pending discount
    pub fn take_pending_discount(&mut self) -> Option<PendingDiscount> {
        self.pending_discount.take()
    }

    /// Whether a discount is waiting
    pub const fn has_pending_discount(&self) -> bool {
        self.pending_discount.is_some()
    }
}
