//! Secondary customer lookup for tax id and signature image.
//!
//! Profiles are keyed by the numeric customer id; accounts created through the
//! auth provider may only be reachable by their opaque auth id. Both keys are
//! tried before a field is treated as absent.

use async_trait::async_trait;
use log::debug;

use super::chain::FieldChain;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerProfile {
    pub tax_id: Option<String>,
    pub signature_url: Option<String>,
}

impl CustomerProfile {
    pub fn new(tax_id: Option<String>, signature_url: Option<String>) -> Self {
        Self {
            tax_id: non_blank(tax_id),
            signature_url: non_blank(signature_url),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.tax_id.is_some() && self.signature_url.is_some()
    }

    /// Fill fields this profile lacks from `other`.
    pub fn merge_missing(self, other: CustomerProfile) -> Self {
        Self {
            tax_id: self.tax_id.or(other.tax_id),
            signature_url: self.signature_url.or(other.signature_url),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Identifiers a record carries for the profile lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerKeys {
    pub customer_id: Option<i64>,
    pub auth_id: Option<String>,
}

impl CustomerKeys {
    pub fn from_record(record: &Value, id_chain: &FieldChain, auth_chain: &FieldChain) -> Self {
        Self {
            customer_id: id_chain.integer(record),
            auth_id: auth_chain.text(record),
        }
    }
}

/// Source of customer profiles, normally the relational store.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn find_by_customer_id(&self, customer_id: i64) -> Result<Option<CustomerProfile>, String>;

    async fn find_by_auth_id(&self, auth_id: &str) -> Result<Option<CustomerProfile>, String>;
}

/// Resolve a profile by numeric id first, then by auth id for whatever is
/// still missing.
pub async fn resolve_profile(
    directory: &dyn CustomerDirectory,
    keys: &CustomerKeys,
) -> Result<CustomerProfile, String> {
    let mut profile = CustomerProfile::default();

    if let Some(customer_id) = keys.customer_id {
        if let Some(found) = directory.find_by_customer_id(customer_id).await? {
            debug!("customer profile found by id {}", customer_id);
            profile = profile.merge_missing(found);
        }
    }

    if !profile.is_complete() {
        if let Some(auth_id) = keys.auth_id.as_deref() {
            if let Some(found) = directory.find_by_auth_id(auth_id).await? {
                debug!("customer profile completed by auth id");
                profile = profile.merge_missing(found);
            }
        }
    }

    Ok(profile)
}
