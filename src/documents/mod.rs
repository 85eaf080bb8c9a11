//! Document subsystem - turns orders and customer records into PDF documents.
//!
//! Pipeline, leaf-first:
//! - `format` - currency, date and filename helpers
//! - `calculation` - pricing breakdown (`PricingEngine`)
//! - `normalizer` - upstream records into `DocumentData` / `StandaloneContractData`
//! - `layout` - page trees for the four document variants
//! - `render` - page tree into PDF bytes
//! - `distribution` - upload, ledger and email of rendered bytes
//! - `service` - orchestration of the above

pub mod calculation;
pub mod distribution;
pub mod format;
pub mod handlers;
pub mod layout;
pub mod model;
pub mod normalizer;
pub mod render;
pub mod service;
pub mod validation;

pub use calculation::{PricedDocument, PricingEngine, RowBreakdown, Totals};
pub use model::{DocumentData, DocumentKind, StandaloneContractData};
pub use service::{DocumentService, GenerationResult};

use thiserror::Error;

use self::calculation::CalculationError;
use self::render::RenderError;
use self::validation::{ValidationError, ValidationErrors};

/// Errors that abort document generation.
///
/// Distribution problems are deliberately absent: they are reported through
/// `distribution::DistributionOutcome` next to the rendered bytes.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("rendering timed out: {0}")]
    RenderTimeout(String),
    #[error("rendering failed: {0}")]
    RenderFailure(String),
    #[error("{0}")]
    NotFound(String),
    #[error("record lookup failed: {0}")]
    Lookup(String),
}

impl DocumentError {
    /// Only a timeout is worth retrying with the same input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RenderTimeout(_))
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::RenderTimeout(_) => 504,
            Self::RenderFailure(_) | Self::Lookup(_) => 500,
        }
    }

    /// Short machine-readable reason, used as a metrics label.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::RenderTimeout(_) => "render_timeout",
            Self::RenderFailure(_) => "render_failure",
            Self::NotFound(_) => "not_found",
            Self::Lookup(_) => "lookup",
        }
    }
}

impl From<ValidationErrors> for DocumentError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<CalculationError> for DocumentError {
    fn from(err: CalculationError) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::new(err.field(), err.to_string()));
        Self::Validation(errors)
    }
}

impl From<RenderError> for DocumentError {
    fn from(err: RenderError) -> Self {
        if err.is_timeout() {
            Self::RenderTimeout(err.to_string())
        } else {
            Self::RenderFailure(err.to_string())
        }
    }
}
