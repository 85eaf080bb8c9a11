//! Document generation orchestration.
//!
//! validate -> price -> assemble -> render -> distribute. Everything up to
//! the render call is synchronous and pure; the render, upload and email
//! calls run in sequence because each consumes the previous output.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use log::{info, warn};
use serde_json::Value;

use super::calculation::{PricedDocument, PricingEngine};
use super::distribution::{DeliveryOptions, DistributionOutcome, Distributor, Shipment};
use super::format::sanitize_filename;
use super::layout::{self, DocumentTree};
use super::model::{DocumentData, DocumentKind, StandaloneContractData};
use super::normalizer::{self, CustomerDirectory, CustomerKeys, CustomerProfile};
use super::render::{RenderAdapter, RenderedDocument};
use super::validation::{ValidationError, ValidationErrors, Validator};
use super::DocumentError;
use crate::config::BusinessConfig;
use crate::metrics;

/// Rendered bytes plus what happened to them afterwards.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub kind: DocumentKind,
    pub document: RenderedDocument,
    pub outcome: DistributionOutcome,
}

impl GenerationResult {
    pub fn is_valid(&self) -> bool {
        self.document.is_valid()
    }
}

#[derive(Clone)]
pub struct DocumentService {
    business: Arc<BusinessConfig>,
    engine: PricingEngine,
    renderer: RenderAdapter,
    distributor: Distributor,
    directory: Option<Arc<dyn CustomerDirectory>>,
}

impl DocumentService {
    pub fn new(business: BusinessConfig, renderer: RenderAdapter, distributor: Distributor) -> Self {
        Self {
            engine: PricingEngine::from_config(&business),
            business: Arc::new(business),
            renderer,
            distributor,
            directory: None,
        }
    }

    pub fn with_directory(mut self, directory: Arc<dyn CustomerDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn business(&self) -> &BusinessConfig {
        &self.business
    }

    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    /// Validate, price and assemble an order-keyed document.
    pub fn prepare_order_tree(
        &self,
        kind: DocumentKind,
        data: DocumentData,
        issued_on: NaiveDate,
    ) -> Result<DocumentTree, DocumentError> {
        let variant = layout::descriptor(kind);
        if variant.keyed_by != layout::KeyedBy::Order {
            let mut errors = ValidationErrors::new();
            errors.add(ValidationError::new(
                "kind",
                format!("{} no se genera a partir de un pedido", kind.title()),
            ));
            return Err(errors.into());
        }
        data.validate()?;
        let priced = PricedDocument::new(data, &self.engine)?;
        Ok(layout::assemble_order_document(
            variant,
            &priced,
            &self.business,
            issued_on,
        ))
    }

    pub fn prepare_customer_contract_tree(
        &self,
        data: &StandaloneContractData,
        issued_on: NaiveDate,
    ) -> Result<DocumentTree, DocumentError> {
        data.validate()?;
        Ok(layout::assemble_customer_contract(data, &self.business, issued_on))
    }

    /// Generate from client-supplied data. The owning order is
    /// `delivery.order_id` when given, else the document id.
    pub async fn generate_order_document(
        &self,
        kind: DocumentKind,
        data: DocumentData,
        delivery: &DeliveryOptions,
    ) -> Result<GenerationResult, DocumentError> {
        let owner_id = delivery
            .order_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| data.document_id.trim())
            .to_string();
        self.generate_order(kind, data, owner_id, delivery).await
    }

    async fn generate_order(
        &self,
        kind: DocumentKind,
        data: DocumentData,
        owner_id: String,
        delivery: &DeliveryOptions,
    ) -> Result<GenerationResult, DocumentError> {
        let recipient = data.billing.full_name();
        let filename = format!(
            "{}-{}.pdf",
            kind.filename_prefix(),
            sanitize_filename(&data.document_id, "documento")
        );
        info!("generating {} for order {}", kind.slug(), owner_id);

        let tree = self
            .prepare_order_tree(kind, data, today())
            .inspect_err(|e| metrics::record_failure(kind, e.reason()))?;
        self.finish(kind, &tree, filename, &owner_id, &recipient, delivery)
            .await
    }

    pub async fn generate_customer_contract(
        &self,
        data: StandaloneContractData,
        delivery: &DeliveryOptions,
    ) -> Result<GenerationResult, DocumentError> {
        let kind = DocumentKind::CustomerContract;
        let filename = format!(
            "{}-{}.pdf",
            kind.filename_prefix(),
            sanitize_filename(&data.full_name, "cliente")
        );
        info!("generating {} for customer {}", kind.slug(), data.customer_id);

        let tree = self
            .prepare_customer_contract_tree(&data, today())
            .inspect_err(|e| metrics::record_failure(kind, e.reason()))?;
        self.finish(kind, &tree, filename, data.customer_id.trim(), &data.full_name, delivery)
            .await
    }

    /// Normalize an order row, completing it with the customer profile.
    pub async fn normalize_order_record(&self, record: &Value) -> Result<DocumentData, DocumentError> {
        let profile = self.lookup_profile(&normalizer::order_keys(record)).await?;
        Ok(normalizer::normalize_order(record, &profile))
    }

    pub async fn normalize_customer_record(
        &self,
        record: &Value,
    ) -> Result<StandaloneContractData, DocumentError> {
        let profile = self.lookup_profile(&normalizer::customer_keys(record)).await?;
        Ok(normalizer::normalize_customer(record, &profile))
    }

    /// Generate from a stored order row; `order_id` is the row key.
    pub async fn generate_from_order_record(
        &self,
        kind: DocumentKind,
        order_id: &str,
        record: &Value,
        delivery: &DeliveryOptions,
    ) -> Result<GenerationResult, DocumentError> {
        let data = self
            .normalize_order_record(record)
            .await
            .inspect_err(|e| metrics::record_failure(kind, e.reason()))?;
        self.generate_order(kind, data, order_id.to_string(), delivery)
            .await
    }

    pub async fn generate_from_customer_record(
        &self,
        record: &Value,
        delivery: &DeliveryOptions,
    ) -> Result<GenerationResult, DocumentError> {
        let data = self
            .normalize_customer_record(record)
            .await
            .inspect_err(|e| metrics::record_failure(DocumentKind::CustomerContract, e.reason()))?;
        self.generate_customer_contract(data, delivery).await
    }

    async fn lookup_profile(&self, keys: &CustomerKeys) -> Result<CustomerProfile, DocumentError> {
        match &self.directory {
            Some(directory) => normalizer::resolve_profile(directory.as_ref(), keys)
                .await
                .map_err(DocumentError::Lookup),
            None => Ok(CustomerProfile::default()),
        }
    }

    async fn finish(
        &self,
        kind: DocumentKind,
        tree: &DocumentTree,
        filename: String,
        owner_id: &str,
        recipient_name: &str,
        delivery: &DeliveryOptions,
    ) -> Result<GenerationResult, DocumentError> {
        let document = match self.renderer.render(tree, filename).await {
            Ok(document) => document,
            Err(e) => {
                let err = DocumentError::from(e);
                warn!("{} for {} failed: {}", kind.slug(), owner_id, err);
                metrics::record_failure(kind, err.reason());
                return Err(err);
            }
        };
        metrics::record_generated(kind);

        let shipment = Shipment {
            kind,
            owner_id,
            recipient_name,
        };
        let outcome = self.distributor.distribute(shipment, &document, delivery).await;

        Ok(GenerationResult {
            kind,
            document,
            outcome,
        })
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
