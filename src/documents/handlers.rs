use actix_web::{web, HttpResponse, Responder};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::distribution::DeliveryOptions;
use super::model::{DocumentData, DocumentKind, StandaloneContractData};
use super::render::PDF_MIME_TYPE;
use super::{DocumentError, GenerationResult};
use crate::{AppState, ErrorResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateDocumentRequest {
    pub data: DocumentData,
    #[serde(default)]
    pub delivery: DeliveryOptions,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateCustomerContractRequest {
    pub data: StandaloneContractData,
    #[serde(default)]
    pub delivery: DeliveryOptions,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocumentResponse {
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: usize,
    /// Whether the bytes start with the PDF signature.
    pub valid: bool,
    /// Base64-encoded document.
    pub data: String,
    pub uploaded: bool,
    pub url: Option<String>,
    pub emailed: bool,
}

impl From<GenerationResult> for GeneratedDocumentResponse {
    fn from(result: GenerationResult) -> Self {
        Self {
            valid: result.is_valid(),
            size_bytes: result.document.size(),
            data: BASE64.encode(&result.document.bytes),
            filename: result.document.filename,
            mime_type: PDF_MIME_TYPE.to_string(),
            uploaded: result.outcome.uploaded,
            url: result.outcome.url,
            emailed: result.outcome.emailed,
        }
    }
}

fn error_response(err: &DocumentError) -> HttpResponse {
    match err {
        DocumentError::Validation(errors) => {
            HttpResponse::BadRequest().json(ErrorResponse::new("ValidationError", &errors.to_message()))
        }
        DocumentError::NotFound(message) => HttpResponse::NotFound().json(ErrorResponse::not_found(message)),
        DocumentError::RenderTimeout(_) => {
            HttpResponse::GatewayTimeout().json(ErrorResponse::new("RenderTimeout", &err.to_string()))
        }
        DocumentError::RenderFailure(_) => {
            HttpResponse::InternalServerError().json(ErrorResponse::new("RenderFailure", &err.to_string()))
        }
        DocumentError::Lookup(_) => HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&err.to_string())),
    }
}

fn respond(result: Result<GenerationResult, DocumentError>) -> HttpResponse {
    match result {
        Ok(result) => HttpResponse::Ok().json(GeneratedDocumentResponse::from(result)),
        Err(e) => {
            log::warn!("document generation failed: {}", e);
            error_response(&e)
        }
    }
}

fn order_kind(slug: &str) -> Result<DocumentKind, HttpResponse> {
    match DocumentKind::from_slug(slug) {
        Some(kind) if kind.is_order_keyed() => Ok(kind),
        _ => Err(HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
            "Unknown document kind '{}', expected quote, contract or confirmation",
            slug
        )))),
    }
}

fn no_database() -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
        "ServiceUnavailable",
        "No database is configured for record lookups",
    ))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Document Service",
    post,
    path = "/documents/{kind}",
    request_body = GenerateDocumentRequest,
    responses(
        (status = 200, description = "Document generated", body = GeneratedDocumentResponse),
        (status = 400, description = "Invalid document data", body = ErrorResponse),
        (status = 500, description = "Rendering failed", body = ErrorResponse),
        (status = 504, description = "Rendering timed out", body = ErrorResponse)
    ),
    params(
        ("kind" = String, Path, description = "quote, contract or confirmation")
    )
)]
pub async fn generate_document(
    kind: web::Path<String>,
    req: web::Json<GenerateDocumentRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let kind = match order_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let req = req.into_inner();
    respond(state.documents.generate_order_document(kind, req.data, &req.delivery).await)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Document Service",
    post,
    path = "/documents/customer-contract",
    request_body = GenerateCustomerContractRequest,
    responses(
        (status = 200, description = "Contract generated", body = GeneratedDocumentResponse),
        (status = 400, description = "Invalid customer data", body = ErrorResponse),
        (status = 500, description = "Rendering failed", body = ErrorResponse),
        (status = 504, description = "Rendering timed out", body = ErrorResponse)
    )
)]
pub async fn generate_customer_contract(
    req: web::Json<GenerateCustomerContractRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let req = req.into_inner();
    respond(state.documents.generate_customer_contract(req.data, &req.delivery).await)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Document Service",
    post,
    path = "/orders/{id}/documents/{kind}",
    request_body(content = DeliveryOptions, description = "Optional delivery options"),
    responses(
        (status = 200, description = "Document generated", body = GeneratedDocumentResponse),
        (status = 400, description = "Invalid order data", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 503, description = "No database configured", body = ErrorResponse)
    ),
    params(
        ("id" = String, Path, description = "Order id"),
        ("kind" = String, Path, description = "quote, contract or confirmation")
    )
)]
pub async fn generate_order_document(
    path: web::Path<(String, String)>,
    delivery: Option<web::Json<DeliveryOptions>>,
    state: web::Data<AppState>,
) -> impl Responder {
    let (order_id, kind) = path.into_inner();
    let kind = match order_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let Some(records) = &state.records else {
        return no_database();
    };
    let delivery = delivery.map(web::Json::into_inner).unwrap_or_default();

    let record = match records.order_record(&order_id).await {
        Ok(Some(record)) => record,
        Ok(None) => return error_response(&DocumentError::NotFound(format!("Order {} not found", order_id))),
        Err(e) => return error_response(&DocumentError::Lookup(e)),
    };
    respond(
        state
            .documents
            .generate_from_order_record(kind, &order_id, &record, &delivery)
            .await,
    )
}

#[utoipa::path(
    context_path = "/api",
    tag = "Document Service",
    post,
    path = "/customers/{id}/contract",
    request_body(content = DeliveryOptions, description = "Optional delivery options"),
    responses(
        (status = 200, description = "Contract generated", body = GeneratedDocumentResponse),
        (status = 400, description = "Invalid customer data", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 503, description = "No database configured", body = ErrorResponse)
    ),
    params(
        ("id" = String, Path, description = "Customer id")
    )
)]
pub async fn generate_customer_contract_for_record(
    customer_id: web::Path<String>,
    delivery: Option<web::Json<DeliveryOptions>>,
    state: web::Data<AppState>,
) -> impl Responder {
    let Some(records) = &state.records else {
        return no_database();
    };
    let delivery = delivery.map(web::Json::into_inner).unwrap_or_default();

    let record = match records.customer_record(&customer_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return error_response(&DocumentError::NotFound(format!(
                "Customer {} not found",
                customer_id.as_str()
            )))
        }
        Err(e) => return error_response(&DocumentError::Lookup(e)),
    };
    respond(state.documents.generate_from_customer_record(&record, &delivery).await)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/documents/customer-contract").route(web::post().to(generate_customer_contract)),
    )
    .service(web::resource("/documents/{kind}").route(web::post().to(generate_document)))
    .service(web::resource("/orders/{id}/documents/{kind}").route(web::post().to(generate_order_document)))
    .service(
        web::resource("/customers/{id}/contract").route(web::post().to(generate_customer_contract_for_record)),
    );
}
