//! Distribution adapter - upload, ledger and email of rendered documents.
//!
//! Every step is best-effort. A failure is logged and reported through
//! `DistributionOutcome`; the rendered bytes stay valid regardless.

pub mod email;
pub mod ledger;
pub mod storage;

pub use email::{compose_email, EmailMessage, EmailSender, HttpEmailSender};
pub use ledger::{append_url_history, DocumentLedger, LedgerTarget};
pub use storage::{HttpObjectStorage, ObjectStorage, UploadRequest};

use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::CompanyIdentity;
use crate::documents::model::DocumentKind;
use crate::documents::render::RenderedDocument;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistributionError {
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("email failed: {0}")]
    Email(String),
    #[error("ledger update failed: {0}")]
    Ledger(String),
}

/// What the caller wants done with the rendered document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOptions {
    #[serde(default)]
    pub upload: bool,
    #[serde(default)]
    pub email_to: Option<String>,
    /// Order row that owns the uploaded file and its ledger entry. When
    /// absent, the document id is used, which only matches the ledger if
    /// the client sends the row id as `documentId`.
    #[serde(default)]
    pub order_id: Option<String>,
}

/// Flags for each distribution step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionOutcome {
    pub uploaded: bool,
    pub url: Option<String>,
    pub ledger_updated: bool,
    pub emailed: bool,
}

/// Identity of the document being distributed.
#[derive(Debug, Clone, Copy)]
pub struct Shipment<'a> {
    pub kind: DocumentKind,
    /// Order id or customer id owning the document.
    pub owner_id: &'a str,
    pub recipient_name: &'a str,
}

#[derive(Clone, Default)]
pub struct Distributor {
    storage: Option<Arc<dyn ObjectStorage>>,
    email: Option<Arc<dyn EmailSender>>,
    ledger: Option<Arc<dyn DocumentLedger>>,
    company: CompanyIdentity,
}

impl Distributor {
    pub fn new(company: CompanyIdentity) -> Self {
        Self {
            company,
            ..Self::default()
        }
    }

    pub fn with_storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_email(mut self, email: Arc<dyn EmailSender>) -> Self {
        self.email = Some(email);
        self
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn DocumentLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Upload, record and email, in that order.
    pub async fn distribute(
        &self,
        shipment: Shipment<'_>,
        rendered: &RenderedDocument,
        delivery: &DeliveryOptions,
    ) -> DistributionOutcome {
        let mut outcome = DistributionOutcome::default();

        if delivery.upload {
            match &self.storage {
                Some(storage) => {
                    let request = UploadRequest {
                        filename: &rendered.filename,
                        bytes: &rendered.bytes,
                        document_type: shipment.kind.storage_tag(),
                        owner_id: shipment.owner_id,
                    };
                    match storage.upload(request).await {
                        Ok(url) => {
                            info!("uploaded {} to {}", rendered.filename, url);
                            outcome.uploaded = true;
                            outcome.url = Some(url);
                        }
                        Err(e) => warn!("{} not uploaded: {}", rendered.filename, e),
                    }
                }
                None => warn!("upload requested for {} but no storage is configured", rendered.filename),
            }
        }

        if let (Some(url), Some(ledger)) = (outcome.url.as_deref(), &self.ledger) {
            let target = LedgerTarget::for_kind(shipment.kind);
            match ledger.record(target, shipment.owner_id, url).await {
                Ok(()) => {
                    info!("recorded {} in {} of {}", url, target.column(), shipment.owner_id);
                    outcome.ledger_updated = true;
                }
                Err(e) => warn!("{}", e),
            }
        }

        if let Some(to) = delivery.email_to.as_deref().map(str::trim).filter(|to| !to.is_empty()) {
            match &self.email {
                Some(sender) => {
                    let message = compose_email(
                        shipment.kind,
                        shipment.owner_id,
                        shipment.recipient_name,
                        &self.company,
                        to,
                        &rendered.filename,
                        rendered.bytes.clone(),
                    );
                    match sender.send(&message).await {
                        Ok(()) => {
                            info!("emailed {} to {}", rendered.filename, to);
                            outcome.emailed = true;
                        }
                        Err(e) => warn!("{} not emailed: {}", rendered.filename, e),
                    }
                }
                None => warn!("email requested for {} but no sender is configured", rendered.filename),
            }
        }

        outcome
    }
}
