//! Service configuration.
//!
//! `AppConfig` is read from the environment (with `.env` support) and wires the
//! boundary collaborators. `BusinessConfig` carries the values every document
//! must agree on: tax rate, deposit split, company identity and legal texts.
//! It is injected into the pricing engine and the layout assemblers so a rate
//! change is a single edit.

mod legal;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub use legal::{LegalClause, LegalTexts};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TYPST_BIN: &str = "typst";
const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_IMAGE_FETCH_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the object-storage upload endpoint.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_url: String,
    pub api_key: Option<String>,
}

/// Connection settings for the transactional email API.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from: String,
}

/// Runtime configuration assembled from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub typst_bin: String,
    pub render_timeout: Duration,
    pub image_fetch_timeout: Duration,
    pub storage: Option<StorageConfig>,
    pub email: Option<EmailConfig>,
    pub business: BusinessConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let storage = optional_var("STORAGE_UPLOAD_URL").map(|upload_url| StorageConfig {
            upload_url,
            api_key: optional_var("STORAGE_API_KEY"),
        });

        let email = match optional_var("EMAIL_API_URL") {
            Some(api_url) => Some(EmailConfig {
                api_url,
                api_key: optional_var("EMAIL_API_KEY"),
                from: optional_var("EMAIL_FROM")
                    .context("EMAIL_FROM must be set when EMAIL_API_URL is configured")?,
            }),
            None => None,
        };

        let business = match optional_var("BUSINESS_CONFIG_PATH") {
            Some(path) => BusinessConfig::from_file(&path)?,
            None => BusinessConfig::default(),
        };

        Ok(Self {
            bind_addr: optional_var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: optional_var("DATABASE_URL"),
            typst_bin: optional_var("TYPST_BIN").unwrap_or_else(|| DEFAULT_TYPST_BIN.to_string()),
            render_timeout: Duration::from_secs(seconds_var(
                "RENDER_TIMEOUT_SECS",
                DEFAULT_RENDER_TIMEOUT_SECS,
            )?),
            image_fetch_timeout: Duration::from_secs(seconds_var(
                "IMAGE_FETCH_TIMEOUT_SECS",
                DEFAULT_IMAGE_FETCH_TIMEOUT_SECS,
            )?),
            storage,
            email,
            business,
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn seconds_var(key: &str, default: u64) -> anyhow::Result<u64> {
    match optional_var(key) {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds, got '{raw}'")),
        None => Ok(default),
    }
}

/// Bank account shown in the company block so customers can pay the deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_type: String,
    pub account_number: String,
    pub account_holder: String,
    pub holder_tax_id: String,
    pub transfer_email: String,
}

/// Fixed business identity printed on every document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyIdentity {
    pub legal_name: String,
    pub trade_name: String,
    pub tax_id: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub representative_name: String,
    pub representative_tax_id: String,
    pub bank: BankDetails,
}

impl Default for CompanyIdentity {
    fn default() -> Self {
        Self {
            legal_name: "Kinetica Rental SpA".to_string(),
            trade_name: "Kinetica Rental".to_string(),
            tax_id: "77.412.385-2".to_string(),
            address: "Av. Italia 1580, Providencia, Santiago".to_string(),
            phone: "+56 2 2940 1180".to_string(),
            email: "reservas@kineticarental.cl".to_string(),
            website: "www.kineticarental.cl".to_string(),
            representative_name: "Tomás Aravena Lillo".to_string(),
            representative_tax_id: "15.872.334-1".to_string(),
            bank: BankDetails {
                bank_name: "Banco de Chile".to_string(),
                account_type: "Cuenta Corriente".to_string(),
                account_number: "00-801-47215-06".to_string(),
                account_holder: "Kinetica Rental SpA".to_string(),
                holder_tax_id: "77.412.385-2".to_string(),
                transfer_email: "pagos@kineticarental.cl".to_string(),
            },
        }
    }
}

/// Values every document generated by one build must agree on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessConfig {
    /// Value-added tax applied to the discounted subtotal.
    pub tax_rate: Decimal,
    /// Share of the tax-inclusive total due at booking.
    pub deposit_rate: Decimal,
    pub company: CompanyIdentity,
    pub legal: LegalTexts,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(19, 2),
            deposit_rate: Decimal::new(25, 2),
            company: CompanyIdentity::default(),
            legal: LegalTexts::default(),
        }
    }
}

impl BusinessConfig {
    /// Load overrides from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read business config at {path}"))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("invalid business config JSON at {path}"))?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.tax_rate < Decimal::ZERO || self.tax_rate >= Decimal::ONE {
            anyhow::bail!("tax_rate must be within [0, 1), got {}", self.tax_rate);
        }
        if self.deposit_rate <= Decimal::ZERO || self.deposit_rate > Decimal::ONE {
            anyhow::bail!("deposit_rate must be within (0, 1], got {}", self.deposit_rate);
        }
        if self.legal.contract_clauses.len() != legal::CONTRACT_CLAUSE_COUNT {
            anyhow::bail!(
                "legal.contract_clauses must hold exactly {} clauses, got {}",
                legal::CONTRACT_CLAUSE_COUNT,
                self.legal.contract_clauses.len()
            );
        }
        Ok(())
    }
}
