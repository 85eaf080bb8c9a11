mod common;

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::json;

use common::*;
use rental_docs_server::config::CompanyIdentity;
use rental_docs_server::documents::distribution::Distributor;
use rental_docs_server::documents::handlers::GeneratedDocumentResponse;
use rental_docs_server::{configure_routes, AppState, ErrorResponse};

fn state(records: Option<MockRecords>, ledger: Arc<MockLedger>) -> AppState {
    let distributor = Distributor::new(CompanyIdentity::default())
        .with_storage(Arc::new(MockObjectStorage::new()))
        .with_ledger(ledger);
    let service = service_with(Arc::new(MockRenderer::pdf()), distributor);
    AppState::new(
        service,
        records.map(|records| Arc::new(records) as Arc<dyn rental_docs_server::db::RecordSource>),
    )
}

fn stored_order() -> serde_json::Value {
    json!({
        "id": 88,
        "order_number": "OC-1042",
        "status": "processing",
        "billing": {
            "first_name": "Camila",
            "last_name": "Rojas",
            "email": "camila@example.cl",
            "rut": "12.345.678-5"
        },
        "metadata": {
            "project": {
                "name": "Rodaje comercial",
                "start_date": "2025-03-10",
                "end_date": "2025-03-12",
                "jornadas": 3
            }
        },
        "line_items": [
            { "name": "Cámara cine", "unit_price": 10000, "quantity": 2 }
        ]
    })
}

#[actix_web::test]
async fn test_generate_quote_returns_base64_pdf() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None, Arc::new(MockLedger::new()))))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/documents/quote")
        .set_json(json!({ "data": sample_order() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: GeneratedDocumentResponse = test::read_body_json(resp).await;
    assert_eq!(body.filename, "cotizacion-1042.pdf");
    assert_eq!(body.mime_type, "application/pdf");
    assert!(body.valid);
    assert!(!body.uploaded);
    assert_eq!(BASE64.decode(body.data).unwrap(), FAKE_PDF);
}

#[actix_web::test]
async fn test_invalid_data_is_bad_request() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None, Arc::new(MockLedger::new()))))
            .configure(configure_routes),
    )
    .await;

    let mut data = sample_order();
    data.line_items.clear();
    let req = test::TestRequest::post()
        .uri("/api/documents/contract")
        .set_json(json!({ "data": data }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "ValidationError");
    assert!(body.message.contains("lineItems"));
}

#[actix_web::test]
async fn test_unknown_kind_is_bad_request() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None, Arc::new(MockLedger::new()))))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/documents/invoice")
        .set_json(json!({ "data": sample_order() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_customer_contract_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None, Arc::new(MockLedger::new()))))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/documents/customer-contract")
        .set_json(json!({ "data": sample_customer(), "delivery": { "upload": true } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: GeneratedDocumentResponse = test::read_body_json(resp).await;
    assert_eq!(body.filename, "contrato-cliente-ana-soto.pdf");
    assert!(body.uploaded);
    assert_eq!(
        body.url.as_deref(),
        Some("http://test.example.com/contrato-cliente-ana-soto.pdf")
    );
}

#[actix_web::test]
async fn test_record_endpoints_need_a_database() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None, Arc::new(MockLedger::new()))))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/orders/88/documents/quote")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_missing_order_is_not_found() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(
                Some(MockRecords::default()),
                Arc::new(MockLedger::new()),
            )))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/orders/404/documents/contract")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_stored_order_quote_is_recorded_on_the_order_row() {
    let ledger = Arc::new(MockLedger::new());
    let mut records = MockRecords::default();
    records.orders.insert("88".to_string(), stored_order());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(Some(records), ledger.clone())))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/orders/88/documents/quote")
        .set_json(json!({ "upload": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: GeneratedDocumentResponse = test::read_body_json(resp).await;
    assert_eq!(body.filename, "cotizacion-oc-1042.pdf");
    assert_eq!(
        ledger.value("quote_urls", "88").await.as_deref(),
        Some("http://test.example.com/cotizacion-oc-1042.pdf")
    );
}

#[actix_web::test]
async fn test_metrics_endpoint_serves_document_counters() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None, Arc::new(MockLedger::new()))))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/documents/confirmation")
        .set_json(json!({ "data": sample_order() }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/metrics/documents").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("documents_generated_total{kind=\"confirmation\"}"));
}

#[actix_web::test]
async fn test_oversized_amounts_are_bad_request() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None, Arc::new(MockLedger::new()))))
            .configure(configure_routes),
    )
    .await;

    let mut data = serde_json::to_value(sample_order()).unwrap();
    data["lineItems"][0]["unitPrice"] = json!("100000000000000000");
    data["lineItems"][0]["quantity"] = json!(1_000_000_000);
    data["project"]["dayCount"] = json!(1_000_000);
    let req = test::TestRequest::post()
        .uri("/api/documents/quote")
        .set_json(json!({ "data": data }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "ValidationError");
    assert!(body.message.contains("lineItems[0].unitPrice"));
}
