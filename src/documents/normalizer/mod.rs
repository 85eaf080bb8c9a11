//! Upstream records into canonical document data.
//!
//! Each logical field is read through its `FieldChain` (structured source,
//! then flat legacy source) with the default applied last. The profile found
//! by `lookup::resolve_profile` fills the tax id and signature when the record
//! itself has none.

pub mod chain;
pub mod fields;
pub mod lookup;

use rust_decimal::Decimal;
use serde_json::Value;
use std::borrow::Cow;

use super::model::{
    BillingParty, CouponInfo, CustomerType, DeliveryMethod, DocumentData, LineItem, ProjectInfo,
    ShippingInfo, StandaloneContractData,
};
pub use chain::FieldChain;
pub use lookup::{resolve_profile, CustomerDirectory, CustomerKeys, CustomerProfile};

const DEFAULT_STATUS: &str = "pending";
const DEFAULT_PROJECT_NAME: &str = "Proyecto sin nombre";
const DEFAULT_ITEM_NAME: &str = "Equipo";
const DEFAULT_COUPON_CODE: &str = "DESCUENTO";
const DEFAULT_SHIPPING_LABEL: &str = "Despacho";
const DEFAULT_DAY_COUNT: i64 = 1;
const DEFAULT_QUANTITY: i64 = 1;

/// Keys used to look up the profile of an order's customer.
pub fn order_keys(record: &Value) -> CustomerKeys {
    let record = expand_metadata(record);
    CustomerKeys::from_record(&record, &fields::order::CUSTOMER_ID, &fields::order::AUTH_ID)
}

/// Keys used to look up the profile of a customer row.
pub fn customer_keys(record: &Value) -> CustomerKeys {
    let record = expand_metadata(record);
    CustomerKeys::from_record(&record, &fields::customer::CUSTOMER_ID, &fields::customer::AUTH_ID)
}

/// Tax id and signature carried by a customer row, for the profile lookup.
pub fn profile_from_customer_record(record: &Value) -> CustomerProfile {
    let record = expand_metadata(record);
    CustomerProfile::new(
        fields::customer::TAX_ID.text(&record),
        fields::customer::SIGNATURE_URL.text(&record),
    )
}

/// Map an order row onto `DocumentData`.
pub fn normalize_order(record: &Value, profile: &CustomerProfile) -> DocumentData {
    use fields::order as f;

    let record = expand_metadata(record);
    let record = record.as_ref();

    let billing = BillingParty {
        first_name: f::FIRST_NAME.text_or(record, ""),
        last_name: f::LAST_NAME.text_or(record, ""),
        email: f::EMAIL.text_or(record, ""),
        phone: f::PHONE.text(record),
        company_name: f::COMPANY_NAME.text(record),
        address: f::ADDRESS.text(record),
        city: f::CITY.text(record),
        tax_id: f::TAX_ID.text(record).or_else(|| profile.tax_id.clone()),
    };

    let project = ProjectInfo {
        name: f::PROJECT_NAME.text_or(record, DEFAULT_PROJECT_NAME),
        start_date: f::START_DATE.text_or(record, ""),
        end_date: f::END_DATE.text_or(record, ""),
        day_count: f::DAY_COUNT.integer(record).unwrap_or(DEFAULT_DAY_COUNT),
        company_tax_id: f::COMPANY_TAX_ID.text(record),
        pickup_contact_name: f::PICKUP_NAME.text(record),
        pickup_contact_phone: f::PICKUP_PHONE.text(record),
        pickup_contact_tax_id: f::PICKUP_TAX_ID.text(record),
        comments: f::COMMENTS.text(record),
    };

    DocumentData {
        document_id: f::DOCUMENT_ID.text_or(record, ""),
        billing,
        project,
        line_items: normalize_line_items(record),
        coupon: normalize_coupon(record),
        status: f::STATUS.text_or(record, DEFAULT_STATUS),
        shipping: normalize_shipping(record),
        counterparty_signature_url: f::SIGNATURE_URL
            .text(record)
            .or_else(|| profile.signature_url.clone()),
    }
}

/// Map a customer row onto `StandaloneContractData`.
pub fn normalize_customer(record: &Value, profile: &CustomerProfile) -> StandaloneContractData {
    use fields::customer as f;

    let record = expand_metadata(record);
    let record = record.as_ref();

    let full_name = f::FULL_NAME.text(record).unwrap_or_else(|| {
        let first = f::FIRST_NAME.text_or(record, "");
        let last = f::LAST_NAME.text_or(record, "");
        format!("{first} {last}").trim().to_string()
    });

    StandaloneContractData {
        customer_id: f::CUSTOMER_ID.text_or(record, ""),
        customer_type: f::CUSTOMER_TYPE
            .text(record)
            .map(|raw| parse_customer_type(&raw))
            .unwrap_or_default(),
        full_name,
        tax_id: f::TAX_ID.text(record).or_else(|| profile.tax_id.clone()),
        email: f::EMAIL.text_or(record, ""),
        phone: f::PHONE.text(record),
        address: f::ADDRESS.text(record),
        city: f::CITY.text(record),
        company_name: f::COMPANY_NAME.text(record),
        company_tax_id: f::COMPANY_TAX_ID.text(record),
        id_front_url: f::ID_FRONT_URL.text(record),
        id_back_url: f::ID_BACK_URL.text(record),
        signature_url: f::SIGNATURE_URL
            .text(record)
            .or_else(|| profile.signature_url.clone()),
        company_registration_url: f::COMPANY_REGISTRATION_URL.text(record),
    }
}

fn normalize_line_items(record: &Value) -> Vec<LineItem> {
    use fields::order as f;

    let Some(items) = f::LINE_ITEMS.array(record) else {
        return Vec::new();
    };

    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| LineItem {
            name: f::ITEM_NAME.text_or(item, DEFAULT_ITEM_NAME),
            sku: f::ITEM_SKU.text(item),
            unit_price: f::ITEM_PRICE.decimal(item).unwrap_or(Decimal::ZERO),
            quantity: f::ITEM_QUANTITY.integer(item).unwrap_or(DEFAULT_QUANTITY),
        })
        .collect()
}

fn normalize_coupon(record: &Value) -> Option<CouponInfo> {
    use fields::order as f;

    let code = f::COUPON_CODE.text(record);
    let discount = f::COUPON_DISCOUNT.decimal(record);

    match (code, discount) {
        (None, None) => None,
        (None, Some(amount)) if amount.is_zero() => None,
        (code, amount) => Some(CouponInfo {
            code: code.unwrap_or_else(|| DEFAULT_COUPON_CODE.to_string()),
            discount_amount: amount.unwrap_or(Decimal::ZERO),
        }),
    }
}

fn normalize_shipping(record: &Value) -> Option<ShippingInfo> {
    use fields::order as f;

    let label = f::SHIPPING_LABEL.text(record);
    let total = f::SHIPPING_TOTAL.decimal(record);
    let method = f::DELIVERY_METHOD
        .text(record)
        .and_then(|raw| parse_delivery_method(&raw));
    let address = f::SHIPPING_ADDRESS.text(record);

    if label.is_none() && total.is_none() && method.is_none() && address.is_none() {
        return None;
    }

    let delivery_method = method.unwrap_or(if address.is_some() {
        DeliveryMethod::Shipping
    } else {
        DeliveryMethod::Pickup
    });

    Some(ShippingInfo {
        method_label: label.unwrap_or_else(|| DEFAULT_SHIPPING_LABEL.to_string()),
        total: total.unwrap_or(Decimal::ZERO),
        delivery_method,
        shipping_address: address,
        shipping_phone: f::SHIPPING_PHONE.text(record),
    })
}

fn parse_delivery_method(raw: &str) -> Option<DeliveryMethod> {
    match raw.trim().to_lowercase().as_str() {
        "pickup" | "retiro" | "local_pickup" => Some(DeliveryMethod::Pickup),
        "shipping" | "despacho" | "delivery" => Some(DeliveryMethod::Shipping),
        _ => None,
    }
}

fn parse_customer_type(raw: &str) -> CustomerType {
    match raw.trim().to_lowercase().as_str() {
        "company" | "empresa" | "business" => CustomerType::Company,
        _ => CustomerType::Individual,
    }
}

/// Some rows store `metadata` as a serialized JSON string; parse it in place
/// so the chains can address its keys.
fn expand_metadata(record: &Value) -> Cow<'_, Value> {
    match record.get("metadata") {
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed) if parsed.is_object() => {
                let mut expanded = record.clone();
                expanded["metadata"] = parsed;
                Cow::Owned(expanded)
            }
            _ => Cow::Borrowed(record),
        },
        _ => Cow::Borrowed(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn current_schema_order() -> Value {
        json!({
            "id": 88,
            "order_number": "OC-1042",
            "status": "processing",
            "customer_id": 10,
            "user_id": "auth-10",
            "billing": {
                "first_name": "Camila",
                "last_name": "Rojas",
                "email": "camila@example.cl",
                "company": "Productora Sur SpA",
                "rut": "76.543.210-3"
            },
            "metadata": {
                "project": {
                    "name": "Rodaje comercial",
                    "start_date": "2025-03-10",
                    "end_date": "2025-03-12",
                    "jornadas": 3
                },
                "pickup": { "contact_name": "Luis Mena", "contact_phone": "+56911112222" }
            },
            "line_items": [
                { "name": "Cámara", "sku": "CAM-01", "unit_price": 10000, "quantity": 2 }
            ]
        })
    }

    fn legacy_order() -> Value {
        json!({
            "id": 12,
            "status": null,
            "billing_first_name": "Pedro",
            "billing_last_name": "Araya",
            "billing_email": "pedro@example.cl",
            "metadata": "{\"project_name\":\"Matrimonio\",\"start_date\":\"2024-11-02\",\"end_date\":\"2024-11-03\",\"jornadas\":\"2\",\"coupon_code\":\"PRIMAVERA\",\"discount_amount\":\"5000\",\"shipping_method\":\"Despacho RM\",\"shipping_total\":15000,\"shipping_address\":\"Los Leones 120\"}",
            "items": [
                { "product_name": "Parlante", "price": "8000", "qty": 3 },
                { "title": "Cable" }
            ]
        })
    }

    #[test]
    fn test_current_schema() {
        let data = normalize_order(&current_schema_order(), &CustomerProfile::default());
        assert_eq!(data.document_id, "OC-1042");
        assert_eq!(data.status, "processing");
        assert_eq!(data.billing.full_name(), "Camila Rojas");
        assert_eq!(data.billing.tax_id.as_deref(), Some("76.543.210-3"));
        assert_eq!(data.project.day_count, 3);
        assert_eq!(data.project.pickup_contact_name.as_deref(), Some("Luis Mena"));
        assert_eq!(data.line_items.len(), 1);
        assert_eq!(data.line_items[0].sku.as_deref(), Some("CAM-01"));
        assert!(data.coupon.is_none());
        assert!(data.shipping.is_none());
    }

    #[test]
    fn test_legacy_schema_with_serialized_metadata() {
        let data = normalize_order(&legacy_order(), &CustomerProfile::default());
        assert_eq!(data.document_id, "12");
        assert_eq!(data.status, DEFAULT_STATUS);
        assert_eq!(data.project.name, "Matrimonio");
        assert_eq!(data.project.day_count, 2);

        assert_eq!(data.line_items[0].name, "Parlante");
        assert_eq!(data.line_items[0].unit_price, Decimal::from(8000));
        assert_eq!(data.line_items[0].quantity, 3);
        assert_eq!(data.line_items[1].name, "Cable");
        assert_eq!(data.line_items[1].quantity, DEFAULT_QUANTITY);

        let coupon = data.coupon.unwrap();
        assert_eq!(coupon.code, "PRIMAVERA");
        assert_eq!(coupon.discount_amount, Decimal::from(5000));

        let shipping = data.shipping.unwrap();
        assert_eq!(shipping.method_label, "Despacho RM");
        assert_eq!(shipping.total, Decimal::from(15000));
        assert_eq!(shipping.delivery_method, DeliveryMethod::Shipping);
    }

    #[test]
    fn test_profile_fills_missing_tax_id_and_signature() {
        let profile = CustomerProfile::new(Some("11.111.111-1".into()), Some("https://cdn/sig.png".into()));
        let data = normalize_order(&legacy_order(), &profile);
        assert_eq!(data.billing.tax_id.as_deref(), Some("11.111.111-1"));
        assert_eq!(data.counterparty_signature_url.as_deref(), Some("https://cdn/sig.png"));

        let data = normalize_order(&current_schema_order(), &profile);
        assert_eq!(data.billing.tax_id.as_deref(), Some("76.543.210-3"));
    }

    #[test]
    fn test_defaults_apply_last() {
        let data = normalize_order(&json!({ "id": 1 }), &CustomerProfile::default());
        assert_eq!(data.project.name, DEFAULT_PROJECT_NAME);
        assert_eq!(data.project.day_count, DEFAULT_DAY_COUNT);
        assert!(data.line_items.is_empty());
    }

    #[test]
    fn test_order_keys() {
        let keys = order_keys(&current_schema_order());
        assert_eq!(keys.customer_id, Some(10));
        assert_eq!(keys.auth_id.as_deref(), Some("auth-10"));
    }

    #[test]
    fn test_normalize_company_customer() {
        let record = json!({
            "id": 7,
            "user_id": "auth-7",
            "customer_type": "empresa",
            "first_name": "Ana",
            "last_name": "Soto",
            "email": "ana@example.cl",
            "company": { "name": "Eventos Andes Ltda", "rut": "76.000.111-2" },
            "documents": { "id_front": "https://cdn/front.jpg" },
            "metadata": { "id_back_url": "https://cdn/back.jpg" }
        });
        let profile = CustomerProfile::new(None, Some("https://cdn/firma.png".into()));
        let data = normalize_customer(&record, &profile);

        assert_eq!(data.customer_id, "7");
        assert_eq!(data.customer_type, CustomerType::Company);
        assert_eq!(data.full_name, "Ana Soto");
        assert_eq!(data.company_name.as_deref(), Some("Eventos Andes Ltda"));
        assert_eq!(data.company_tax_id.as_deref(), Some("76.000.111-2"));
        assert_eq!(data.id_front_url.as_deref(), Some("https://cdn/front.jpg"));
        assert_eq!(data.id_back_url.as_deref(), Some("https://cdn/back.jpg"));
        assert_eq!(data.signature_url.as_deref(), Some("https://cdn/firma.png"));
        assert_eq!(customer_keys(&record).auth_id.as_deref(), Some("auth-7"));
    }
}
