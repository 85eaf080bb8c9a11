mod common;

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;

use common::*;
use rental_docs_server::config::CompanyIdentity;
use rental_docs_server::documents::distribution::Distributor;
use rental_docs_server::documents::model::{CustomerType, DeliveryMethod};
use rental_docs_server::documents::normalizer::CustomerProfile;
use rental_docs_server::documents::DocumentError;

fn service(directory: MockDirectory) -> rental_docs_server::documents::DocumentService {
    service_with(
        Arc::new(MockRenderer::pdf()),
        Distributor::new(CompanyIdentity::default()),
    )
    .with_directory(Arc::new(directory))
}

#[tokio::test]
async fn test_flat_legacy_order_is_normalized() {
    let record = json!({
        "id": 501,
        "status": "completed",
        "billing_first_name": "Tomás",
        "billing_last_name": "Fuentes",
        "billing_email": "tomas@example.cl",
        "billing_rut": "9.876.543-2",
        "metadata": "{\"jornadas\": 2, \"start_date\": \"2024-11-04\", \"end_date\": \"2024-11-05\", \"project_name\": \"Videoclip\"}",
        "items": [
            { "product_name": "Luz LED", "price": "15000", "qty": "2" },
            "not-an-item"
        ],
        "discount_total": 0,
        "shipping_method": "Retiro en bodega",
        "delivery_method": "retiro"
    });

    let data = service(MockDirectory::default())
        .normalize_order_record(&record)
        .await
        .unwrap();

    assert_eq!(data.document_id, "501");
    assert_eq!(data.status, "completed");
    assert_eq!(data.billing.full_name(), "Tomás Fuentes");
    assert_eq!(data.billing.tax_id.as_deref(), Some("9.876.543-2"));
    assert_eq!(data.project.name, "Videoclip");
    assert_eq!(data.project.day_count, 2);
    assert_eq!(data.line_items.len(), 1);
    assert_eq!(data.line_items[0].unit_price, Decimal::from(15000));
    assert_eq!(data.line_items[0].quantity, 2);
    assert!(data.coupon.is_none());
    let shipping = data.shipping.unwrap();
    assert_eq!(shipping.delivery_method, DeliveryMethod::Pickup);
    assert_eq!(shipping.total, Decimal::ZERO);
}

#[tokio::test]
async fn test_missing_fields_fall_back_to_defaults() {
    let data = service(MockDirectory::default())
        .normalize_order_record(&json!({ "order_number": "OC-9", "line_items": [{}] }))
        .await
        .unwrap();

    assert_eq!(data.document_id, "OC-9");
    assert_eq!(data.status, "pending");
    assert_eq!(data.project.name, "Proyecto sin nombre");
    assert_eq!(data.project.day_count, 1);
    assert_eq!(data.line_items[0].name, "Equipo");
    assert_eq!(data.line_items[0].quantity, 1);
    assert!(data.shipping.is_none());
}

#[tokio::test]
async fn test_profile_by_id_completed_by_auth_id() {
    let mut directory = MockDirectory::default();
    directory
        .by_id
        .insert(10, CustomerProfile::new(Some("76.543.210-3".to_string()), None));
    directory.by_auth.insert(
        "auth-10".to_string(),
        CustomerProfile::new(
            Some("11.111.111-1".to_string()),
            Some("https://cdn.example.cl/sig.png".to_string()),
        ),
    );

    let record = json!({
        "order_number": "OC-1042",
        "customer_id": 10,
        "user_id": "auth-10",
        "billing": { "first_name": "Camila", "last_name": "Rojas", "email": "camila@example.cl" },
        "line_items": []
    });

    let data = service(directory).normalize_order_record(&record).await.unwrap();

    assert_eq!(data.billing.tax_id.as_deref(), Some("76.543.210-3"));
    assert_eq!(
        data.counterparty_signature_url.as_deref(),
        Some("https://cdn.example.cl/sig.png")
    );
}

#[tokio::test]
async fn test_record_values_take_precedence_over_profile() {
    let mut directory = MockDirectory::default();
    directory
        .by_id
        .insert(10, CustomerProfile::new(Some("76.543.210-3".to_string()), None));

    let record = json!({
        "customer_id": 10,
        "billing": { "rut": "12.345.678-5" },
        "metadata": { "signature_url": "https://cdn.example.cl/own.png" }
    });

    let data = service(directory).normalize_order_record(&record).await.unwrap();
    assert_eq!(data.billing.tax_id.as_deref(), Some("12.345.678-5"));
    assert_eq!(
        data.counterparty_signature_url.as_deref(),
        Some("https://cdn.example.cl/own.png")
    );
}

#[tokio::test]
async fn test_company_customer_record() {
    let record = json!({
        "id": 31,
        "type": "empresa",
        "first_name": "Pedro",
        "last_name": "Lagos",
        "rut": "10.000.000-8",
        "email": "pedro@sur.cl",
        "company": { "name": "Productora Sur SpA", "rut": "76.543.210-3" },
        "documents": {
            "id_front": "https://cdn.example.cl/front.jpg",
            "company_registration": "https://cdn.example.cl/escritura.pdf"
        }
    });

    let data = service(MockDirectory::default())
        .normalize_customer_record(&record)
        .await
        .unwrap();

    assert_eq!(data.customer_type, CustomerType::Company);
    assert_eq!(data.full_name, "Pedro Lagos");
    assert_eq!(data.company_name.as_deref(), Some("Productora Sur SpA"));
    assert_eq!(data.attachments().len(), 2);
}

struct BrokenDirectory;

#[async_trait::async_trait]
impl rental_docs_server::documents::normalizer::CustomerDirectory for BrokenDirectory {
    async fn find_by_customer_id(&self, _: i64) -> Result<Option<CustomerProfile>, String> {
        Err("connection reset".to_string())
    }

    async fn find_by_auth_id(&self, _: &str) -> Result<Option<CustomerProfile>, String> {
        Err("connection reset".to_string())
    }
}

#[tokio::test]
async fn test_directory_failure_is_lookup_error() {
    let service = service_with(
        Arc::new(MockRenderer::pdf()),
        Distributor::new(CompanyIdentity::default()),
    )
    .with_directory(Arc::new(BrokenDirectory));

    let err = service
        .normalize_order_record(&json!({ "customer_id": 4 }))
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::Lookup(_)));
    assert_eq!(err.status_code(), 500);
}
