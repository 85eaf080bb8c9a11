//! Database module - AppState and record access
//!
//! - `store` - Postgres reads of order/customer rows and document URL writes

mod store;

pub use store::PgStore;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::documents::distribution::{Distributor, HttpEmailSender, HttpObjectStorage};
use crate::documents::render::{RenderAdapter, TypstRenderer};
use crate::documents::DocumentService;

/// Source of raw order and customer rows.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn order_record(&self, order_id: &str) -> Result<Option<Value>, String>;

    async fn customer_record(&self, customer_id: &str) -> Result<Option<Value>, String>;
}

#[derive(Clone)]
pub struct AppState {
    pub documents: DocumentService,
    /// Absent when no database is configured.
    pub records: Option<Arc<dyn RecordSource>>,
}

impl AppState {
    pub fn new(documents: DocumentService, records: Option<Arc<dyn RecordSource>>) -> Self {
        Self { documents, records }
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let renderer = RenderAdapter::new(
            Arc::new(TypstRenderer::new(config.typst_bin.clone(), config.image_fetch_timeout)),
            config.render_timeout,
        );

        let mut distributor = Distributor::new(config.business.company.clone());
        match &config.storage {
            Some(storage) => {
                distributor = distributor.with_storage(Arc::new(HttpObjectStorage::new(storage.clone())))
            }
            None => log::warn!("STORAGE_UPLOAD_URL not set, uploads are disabled"),
        }
        match &config.email {
            Some(email) => distributor = distributor.with_email(Arc::new(HttpEmailSender::new(email.clone()))),
            None => log::warn!("EMAIL_API_URL not set, emails are disabled"),
        }

        let store = match &config.database_url {
            Some(database_url) => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(20)
                    .acquire_timeout(Duration::from_secs(30))
                    .idle_timeout(Duration::from_secs(900))
                    .connect(database_url)
                    .await?;
                Some(Arc::new(PgStore::new(pool)))
            }
            None => {
                log::warn!("DATABASE_URL not set, record endpoints and ledger writes are disabled");
                None
            }
        };

        if let Some(store) = &store {
            distributor = distributor.with_ledger(store.clone());
        }
        let mut documents = DocumentService::new(config.business.clone(), renderer, distributor);
        if let Some(store) = &store {
            documents = documents.with_directory(store.clone());
        }

        Ok(Self {
            documents,
            records: store.map(|store| store as Arc<dyn RecordSource>),
        })
    }
}
