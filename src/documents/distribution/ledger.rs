//! Record of stored document URLs on the owning order or customer row.

use async_trait::async_trait;

use super::DistributionError;
use crate::documents::model::DocumentKind;

/// Which column a stored URL lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerTarget {
    /// Appended to the order's comma-separated quote history.
    QuoteHistory,
    OrderContract,
    OrderConfirmation,
    CustomerContract,
}

impl LedgerTarget {
    pub fn for_kind(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Quote => Self::QuoteHistory,
            DocumentKind::OrderContract => Self::OrderContract,
            DocumentKind::ProcessingConfirmation => Self::OrderConfirmation,
            DocumentKind::CustomerContract => Self::CustomerContract,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::QuoteHistory => "quote_urls",
            Self::OrderContract | Self::CustomerContract => "contract_url",
            Self::OrderConfirmation => "confirmation_url",
        }
    }

    pub fn appends(&self) -> bool {
        matches!(self, Self::QuoteHistory)
    }
}

#[async_trait]
pub trait DocumentLedger: Send + Sync {
    async fn record(&self, target: LedgerTarget, owner_id: &str, url: &str) -> Result<(), DistributionError>;
}

/// Append `url` to a comma-separated history. Earlier entries are never
/// dropped, duplicates included.
pub fn append_url_history(history: Option<&str>, url: &str) -> String {
    match history.map(str::trim).filter(|h| !h.is_empty()) {
        Some(existing) => format!("{existing},{url}"),
        None => url.to_string(),
    }
}
