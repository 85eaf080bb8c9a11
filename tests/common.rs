#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use rental_docs_server::config::BusinessConfig;
use rental_docs_server::db::RecordSource;
use rental_docs_server::documents::distribution::{
    append_url_history, DistributionError, Distributor, DocumentLedger, EmailMessage, EmailSender,
    LedgerTarget, ObjectStorage, UploadRequest,
};
use rental_docs_server::documents::layout::DocumentTree;
use rental_docs_server::documents::model::{
    BillingParty, CustomerType, DocumentData, LineItem, ProjectInfo, StandaloneContractData,
};
use rental_docs_server::documents::normalizer::{CustomerDirectory, CustomerProfile};
use rental_docs_server::documents::render::{DocumentRenderer, RenderAdapter, RenderError};
use rental_docs_server::documents::DocumentService;

pub const FAKE_PDF: &[u8] = b"%PDF-1.7\n% rental-docs test\n%%EOF";

pub fn issued_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
}

/// Renderer returning fixed bytes and counting calls.
pub struct MockRenderer {
    bytes: Vec<u8>,
    delay: Option<Duration>,
    pub calls: Mutex<Vec<DocumentTree>>,
}

impl MockRenderer {
    pub fn pdf() -> Self {
        Self::returning(FAKE_PDF.to_vec())
    }

    pub fn returning(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            bytes: FAKE_PDF.to_vec(),
            delay: Some(delay),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DocumentRenderer for MockRenderer {
    async fn render(&self, tree: &DocumentTree) -> Result<Vec<u8>, RenderError> {
        self.calls.lock().await.push(tree.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.bytes.clone())
    }
}

/// Mock implementation of ObjectStorage for testing
pub struct MockObjectStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    uploads: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            uploads: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub async fn has_file(&self, filename: &str) -> bool {
        self.files.lock().await.contains_key(filename)
    }

    /// (document type, owner id) of every successful upload.
    pub async fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().await.clone()
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn upload(&self, request: UploadRequest<'_>) -> Result<String, DistributionError> {
        if self.fail {
            return Err(DistributionError::Upload("storage unavailable".to_string()));
        }
        self.files
            .lock()
            .await
            .insert(request.filename.to_string(), request.bytes.to_vec());
        self.uploads
            .lock()
            .await
            .push((request.document_type.to_string(), request.owner_id.to_string()));
        Ok(format!("http://test.example.com/{}", request.filename))
    }
}

pub struct MockEmailSender {
    pub sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DistributionError> {
        if self.fail {
            return Err(DistributionError::Email("smtp relay down".to_string()));
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

/// In-memory document URL columns keyed by (column, owner id).
pub struct MockLedger {
    pub columns: Mutex<HashMap<(&'static str, String), String>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            columns: Mutex::new(HashMap::new()),
        }
    }

    pub async fn value(&self, column: &'static str, owner_id: &str) -> Option<String> {
        self.columns
            .lock()
            .await
            .get(&(column, owner_id.to_string()))
            .cloned()
    }
}

#[async_trait]
impl DocumentLedger for MockLedger {
    async fn record(&self, target: LedgerTarget, owner_id: &str, url: &str) -> Result<(), DistributionError> {
        let mut columns = self.columns.lock().await;
        let key = (target.column(), owner_id.to_string());
        let value = if target.appends() {
            append_url_history(columns.get(&key).map(String::as_str), url)
        } else {
            url.to_string()
        };
        columns.insert(key, value);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockDirectory {
    pub by_id: HashMap<i64, CustomerProfile>,
    pub by_auth: HashMap<String, CustomerProfile>,
}

#[async_trait]
impl CustomerDirectory for MockDirectory {
    async fn find_by_customer_id(&self, customer_id: i64) -> Result<Option<CustomerProfile>, String> {
        Ok(self.by_id.get(&customer_id).cloned())
    }

    async fn find_by_auth_id(&self, auth_id: &str) -> Result<Option<CustomerProfile>, String> {
        Ok(self.by_auth.get(auth_id).cloned())
    }
}

#[derive(Default)]
pub struct MockRecords {
    pub orders: HashMap<String, Value>,
    pub customers: HashMap<String, Value>,
}

#[async_trait]
impl RecordSource for MockRecords {
    async fn order_record(&self, order_id: &str) -> Result<Option<Value>, String> {
        Ok(self.orders.get(order_id).cloned())
    }

    async fn customer_record(&self, customer_id: &str) -> Result<Option<Value>, String> {
        Ok(self.customers.get(customer_id).cloned())
    }
}

pub fn service_with(renderer: Arc<dyn DocumentRenderer>, distributor: Distributor) -> DocumentService {
    DocumentService::new(
        BusinessConfig::default(),
        RenderAdapter::new(renderer, Duration::from_secs(2)),
        distributor,
    )
}

pub fn sample_order() -> DocumentData {
    DocumentData {
        document_id: "1042".to_string(),
        billing: BillingParty {
            first_name: "Camila".to_string(),
            last_name: "Rojas".to_string(),
            email: "camila@example.cl".to_string(),
            phone: Some("+56 9 1234 5678".to_string()),
            company_name: None,
            address: Some("Los Leones 120".to_string()),
            city: Some("Providencia".to_string()),
            tax_id: Some("12.345.678-5".to_string()),
        },
        project: ProjectInfo {
            name: "Rodaje comercial".to_string(),
            start_date: "2025-03-10".to_string(),
            end_date: "2025-03-12".to_string(),
            day_count: 3,
            company_tax_id: None,
            pickup_contact_name: None,
            pickup_contact_phone: None,
            pickup_contact_tax_id: None,
            comments: None,
        },
        line_items: vec![LineItem {
            name: "Cámara cine".to_string(),
            sku: Some("CAM-01".to_string()),
            unit_price: Decimal::from(10000),
            quantity: 2,
        }],
        coupon: None,
        status: "pending".to_string(),
        shipping: None,
        counterparty_signature_url: None,
    }
}

pub fn sample_customer() -> StandaloneContractData {
    StandaloneContractData {
        customer_id: "77".to_string(),
        customer_type: CustomerType::Individual,
        full_name: "Ana Soto".to_string(),
        tax_id: Some("16.111.222-3".to_string()),
        email: "ana@example.cl".to_string(),
        phone: None,
        address: None,
        city: None,
        company_name: None,
        company_tax_id: None,
        id_front_url: Some("https://cdn.example.cl/front.png".to_string()),
        id_back_url: Some("https://cdn.example.cl/back.png".to_string()),
        signature_url: None,
        company_registration_url: None,
    }
}
