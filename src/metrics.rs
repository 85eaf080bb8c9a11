//! Document counters, served next to the HTTP metrics.

use actix_web::{HttpResponse, Responder};
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::documents::DocumentKind;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    static ref DOCUMENTS_GENERATED: IntCounterVec = register(IntCounterVec::new(
        Opts::new("documents_generated_total", "Documents rendered successfully"),
        &["kind"],
    ));
    static ref DOCUMENT_FAILURES: IntCounterVec = register(IntCounterVec::new(
        Opts::new("document_failures_total", "Document generations that failed"),
        &["kind", "reason"],
    ));
}

fn register(counter: prometheus::Result<IntCounterVec>) -> IntCounterVec {
    let counter = counter.expect("static counter definition is valid");
    if let Err(e) = REGISTRY.register(Box::new(counter.clone())) {
        log::warn!("metric registration failed: {}", e);
    }
    counter
}

pub fn record_generated(kind: DocumentKind) {
    DOCUMENTS_GENERATED.with_label_values(&[kind.slug()]).inc();
}

pub fn record_failure(kind: DocumentKind, reason: &str) {
    DOCUMENT_FAILURES.with_label_values(&[kind.slug(), reason]).inc();
}

pub fn generated_count(kind: DocumentKind) -> u64 {
    DOCUMENTS_GENERATED.with_label_values(&[kind.slug()]).get()
}

/// Text exposition of the document counters.
pub async fn document_metrics() -> impl Responder {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer) {
        log::error!("failed to encode metrics: {}", e);
        return HttpResponse::InternalServerError().finish();
    }
    HttpResponse::Ok()
        .content_type(prometheus::TEXT_FORMAT)
        .body(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let before = generated_count(DocumentKind::ProcessingConfirmation);
        record_generated(DocumentKind::ProcessingConfirmation);
        assert_eq!(generated_count(DocumentKind::ProcessingConfirmation), before + 1);

        record_failure(DocumentKind::Quote, "render_timeout");
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("document_failures_total{kind=\"quote\",reason=\"render_timeout\"}"));
    }
}
