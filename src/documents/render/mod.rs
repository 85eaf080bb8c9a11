//! Render adapter - page tree into PDF bytes.
//!
//! Rendering is one fallible step with no partial output. The adapter bounds
//! it with a timeout and refuses any payload that does not start with the PDF
//! signature.

pub mod markup;
mod typst;

pub use typst::TypstRenderer;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, info, warn};
use thiserror::Error;

use super::layout::DocumentTree;

/// Leading bytes of every PDF file.
pub const PDF_SIGNATURE: &[u8] = b"%PDF-";

pub const PDF_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("rendering exceeded {0}")]
    Timeout(String),
    #[error("failed to fetch image {url}: {reason}")]
    ImageFetch { url: String, reason: String },
    #[error("image fetch for {0} timed out")]
    ImageFetchTimeout(String),
    #[error("render workspace I/O failed: {0}")]
    Io(#[source] std::io::Error),
    #[error("Typst CLI exited with status {code}: {stderr}")]
    CompilerExit { code: i32, stderr: String },
    #[error("Typst CLI could not be started: {0}")]
    Compiler(#[source] std::io::Error),
    #[error("renderer output does not start with the PDF signature")]
    InvalidSignature,
}

impl RenderError {
    /// Timeouts may succeed on retry; everything else needs different input.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::ImageFetchTimeout(_))
    }
}

/// Anything able to turn a page tree into document bytes.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, tree: &DocumentTree) -> Result<Vec<u8>, RenderError>;
}

pub fn verify_signature(bytes: &[u8]) -> Result<(), RenderError> {
    if bytes.starts_with(PDF_SIGNATURE) {
        Ok(())
    } else {
        Err(RenderError::InvalidSignature)
    }
}

/// Result of a successful render.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_valid(&self) -> bool {
        self.bytes.starts_with(PDF_SIGNATURE)
    }
}

#[derive(Clone)]
pub struct RenderAdapter {
    renderer: Arc<dyn DocumentRenderer>,
    timeout: Duration,
}

impl RenderAdapter {
    pub fn new(renderer: Arc<dyn DocumentRenderer>, timeout: Duration) -> Self {
        Self { renderer, timeout }
    }

    pub async fn render(&self, tree: &DocumentTree, filename: String) -> Result<RenderedDocument, RenderError> {
        let started = Instant::now();
        debug!("rendering {} ({} pages)", filename, tree.pages.len());

        let bytes = match tokio::time::timeout(self.timeout, self.renderer.render(tree)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("rendering {} timed out after {:?}", filename, self.timeout);
                return Err(RenderError::Timeout(format!("{:?}", self.timeout)));
            }
        };

        if let Err(err) = verify_signature(&bytes) {
            warn!(
                "renderer returned {} bytes for {} without PDF signature",
                bytes.len(),
                filename
            );
            return Err(err);
        }

        info!(
            "rendered {} ({} bytes) in {:?}",
            filename,
            bytes.len(),
            started.elapsed()
        );
        Ok(RenderedDocument { filename, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::model::DocumentKind;

    struct FixedRenderer(Vec<u8>);

    #[async_trait]
    impl DocumentRenderer for FixedRenderer {
        async fn render(&self, _tree: &DocumentTree) -> Result<Vec<u8>, RenderError> {
            Ok(self.0.clone())
        }
    }

    struct SlowRenderer;

    #[async_trait]
    impl DocumentRenderer for SlowRenderer {
        async fn render(&self, _tree: &DocumentTree) -> Result<Vec<u8>, RenderError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(PDF_SIGNATURE.to_vec())
        }
    }

    fn tree() -> DocumentTree {
        DocumentTree::new(DocumentKind::Quote, "Cotización")
    }

    #[tokio::test]
    async fn test_accepts_signed_output() {
        let adapter = RenderAdapter::new(
            Arc::new(FixedRenderer(b"%PDF-1.7\n...".to_vec())),
            Duration::from_secs(1),
        );
        let rendered = adapter.render(&tree(), "cotizacion-1.pdf".into()).await.unwrap();
        assert!(rendered.is_valid());
        assert_eq!(rendered.size(), 12);
    }

    #[tokio::test]
    async fn test_rejects_unsigned_output() {
        let adapter = RenderAdapter::new(
            Arc::new(FixedRenderer(b"<html>".to_vec())),
            Duration::from_secs(1),
        );
        let err = adapter.render(&tree(), "x.pdf".into()).await.unwrap_err();
        assert!(matches!(err, RenderError::InvalidSignature));
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_times_out() {
        let adapter = RenderAdapter::new(Arc::new(SlowRenderer), Duration::from_millis(20));
        let err = adapter.render(&tree(), "x.pdf".into()).await.unwrap_err();
        assert!(err.is_timeout());
    }
}
