//! Canonical document data.
//!
//! These envelopes are built once per generation request, consumed by the
//! layout stage and then dropped. Totals are not part of the envelope: they
//! are derived by `calculation::PricedDocument`, so a client cannot supply
//! figures that disagree with the line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One ordered catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    /// Daily rental rate per unit.
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    pub quantity: i64,
}

/// Rental window and logistics notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    /// Number of billed rental days ("jornadas"); multiplies every line.
    pub day_count: i64,
    #[serde(default)]
    pub company_tax_id: Option<String>,
    #[serde(default)]
    pub pickup_contact_name: Option<String>,
    #[serde(default)]
    pub pickup_contact_phone: Option<String>,
    #[serde(default)]
    pub pickup_contact_tax_id: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillingParty {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
}

impl BillingParty {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Billing is to a company when a company name is present.
    pub fn is_company(&self) -> bool {
        self.company_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Pickup,
    Shipping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub method_label: String,
    #[schema(value_type = f64)]
    pub total: Decimal,
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub shipping_phone: Option<String>,
}

/// A validated coupon. The discount is a flat currency amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponInfo {
    pub code: String,
    #[schema(value_type = f64)]
    pub discount_amount: Decimal,
}

/// Canonical envelope for the order-keyed variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentData {
    pub document_id: String,
    pub billing: BillingParty,
    pub project: ProjectInfo,
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub coupon: Option<CouponInfo>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub shipping: Option<ShippingInfo>,
    #[serde(default)]
    pub counterparty_signature_url: Option<String>,
}

impl DocumentData {
    /// Flat discount carried by the coupon, zero without one.
    pub fn discount(&self) -> Decimal {
        self.coupon
            .as_ref()
            .map(|coupon| coupon.discount_amount)
            .unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    #[default]
    Individual,
    Company,
}

/// Envelope for the standalone customer contract, keyed by customer identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StandaloneContractData {
    pub customer_id: String,
    #[serde(default)]
    pub customer_type: CustomerType,
    pub full_name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_tax_id: Option<String>,
    #[serde(default)]
    pub id_front_url: Option<String>,
    #[serde(default)]
    pub id_back_url: Option<String>,
    #[serde(default)]
    pub signature_url: Option<String>,
    #[serde(default)]
    pub company_registration_url: Option<String>,
}

impl StandaloneContractData {
    /// Identity documents that were supplied, in attachment order.
    pub fn attachments(&self) -> Vec<(&'static str, &str)> {
        [
            ("Cédula de identidad (anverso)", self.id_front_url.as_deref()),
            ("Cédula de identidad (reverso)", self.id_back_url.as_deref()),
            ("Firma registrada", self.signature_url.as_deref()),
            (
                "Escritura o registro de la empresa",
                self.company_registration_url.as_deref(),
            ),
        ]
        .into_iter()
        .filter_map(|(label, url)| {
            url.map(str::trim)
                .filter(|url| !url.is_empty())
                .map(|url| (label, url))
        })
        .collect()
    }
}

/// The four document variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Quote,
    OrderContract,
    ProcessingConfirmation,
    CustomerContract,
}

impl DocumentKind {
    /// Parse the path segment used by the HTTP routes.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "quote" => Some(Self::Quote),
            "contract" => Some(Self::OrderContract),
            "confirmation" => Some(Self::ProcessingConfirmation),
            "customer-contract" => Some(Self::CustomerContract),
            _ => None,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::OrderContract => "contract",
            Self::ProcessingConfirmation => "confirmation",
            Self::CustomerContract => "customer-contract",
        }
    }

    /// Tag sent to object storage alongside the file.
    pub fn storage_tag(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::OrderContract => "contract",
            Self::ProcessingConfirmation => "confirmation",
            Self::CustomerContract => "customer_contract",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Quote => "Cotización",
            Self::OrderContract => "Contrato de Arriendo",
            Self::ProcessingConfirmation => "Confirmación de Procesamiento",
            Self::CustomerContract => "Contrato de Cliente",
        }
    }

    pub fn filename_prefix(&self) -> &'static str {
        match self {
            Self::Quote => "cotizacion",
            Self::OrderContract => "contrato",
            Self::ProcessingConfirmation => "confirmacion",
            Self::CustomerContract => "contrato-cliente",
        }
    }

    pub fn is_order_keyed(&self) -> bool {
        !matches!(self, Self::CustomerContract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_data_deserialization() {
        let json = r#"{
            "documentId": "1042",
            "billing": {
                "firstName": "Camila",
                "lastName": "Rojas",
                "email": "camila@example.cl"
            },
            "project": {
                "name": "Rodaje comercial",
                "startDate": "2025-03-10",
                "endDate": "2025-03-12",
                "dayCount": 3
            },
            "lineItems": [
                { "name": "Cámara", "unitPrice": 10000, "quantity": 2 }
            ],
            "coupon": { "code": "VERANO", "discountAmount": "10000" },
            "totals": { "subtotal": 1 }
        }"#;

        let data: DocumentData = serde_json::from_str(json).unwrap();
        assert_eq!(data.billing.full_name(), "Camila Rojas");
        assert_eq!(data.project.day_count, 3);
        assert_eq!(data.line_items[0].unit_price, Decimal::from(10000));
        assert_eq!(data.discount(), Decimal::from(10000));
        assert!(data.shipping.is_none());
        assert!(!data.billing.is_company());
    }

    #[test]
    fn test_attachments_skip_missing_and_blank() {
        let data = StandaloneContractData {
            customer_id: "7".into(),
            customer_type: CustomerType::Individual,
            full_name: "Ana Soto".into(),
            tax_id: None,
            email: "ana@example.cl".into(),
            phone: None,
            address: None,
            city: None,
            company_name: None,
            company_tax_id: None,
            id_front_url: Some("https://cdn.example.cl/front.jpg".into()),
            id_back_url: Some("   ".into()),
            signature_url: None,
            company_registration_url: Some("https://cdn.example.cl/escritura.pdf".into()),
        };

        let attachments = data.attachments();
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].0, "Cédula de identidad (anverso)");
        assert_eq!(attachments[1].1, "https://cdn.example.cl/escritura.pdf");
    }

    #[test]
    fn test_kind_slugs() {
        for kind in [
            DocumentKind::Quote,
            DocumentKind::OrderContract,
            DocumentKind::ProcessingConfirmation,
            DocumentKind::CustomerContract,
        ] {
            assert_eq!(DocumentKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(DocumentKind::from_slug("invoice"), None);
    }
}
