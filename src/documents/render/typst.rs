//! Typst CLI renderer.
//!
//! Writes the emitted source plus every referenced image into a temporary
//! directory, then runs `typst compile`. Images are fetched concurrently, each
//! bounded by its own timeout.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, error};
use tempfile::tempdir;
use tokio::process::Command;

use super::markup::{to_typst, ImageMap};
use super::{DocumentRenderer, RenderError};
use crate::documents::layout::DocumentTree;

const SOURCE_FILE: &str = "document.typ";
const OUTPUT_FILE: &str = "document.pdf";
const FALLBACK_IMAGE_EXTENSION: &str = "png";

pub struct TypstRenderer {
    typst_bin: String,
    client: reqwest::Client,
    image_timeout: Duration,
}

impl TypstRenderer {
    pub fn new(typst_bin: impl Into<String>, image_timeout: Duration) -> Self {
        Self {
            typst_bin: typst_bin.into(),
            client: reqwest::Client::new(),
            image_timeout,
        }
    }

    async fn fetch_image(&self, url: &str, index: usize, dir: &Path) -> Result<String, RenderError> {
        let fetch = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map_err(|err| RenderError::ImageFetch {
                    url: url.to_string(),
                    reason: err.to_string(),
                })?;
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.split(';').next().unwrap_or(value).trim().to_string());
            let bytes = response.bytes().await.map_err(|err| RenderError::ImageFetch {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
            Ok::<_, RenderError>((content_type, bytes))
        };

        let (content_type, bytes) = tokio::time::timeout(self.image_timeout, fetch)
            .await
            .map_err(|_| RenderError::ImageFetchTimeout(url.to_string()))??;

        let extension = image_extension(url, content_type.as_deref());
        let filename = format!("img-{index}.{extension}");
        tokio::fs::write(dir.join(&filename), &bytes)
            .await
            .map_err(RenderError::Io)?;
        debug!("fetched image {} ({} bytes) as {}", url, bytes.len(), filename);
        Ok(filename)
    }
}

/// File extension for a downloaded image: from the content type when known,
/// otherwise from the URL path.
fn image_extension(url: &str, content_type: Option<&str>) -> String {
    match content_type {
        Some("image/jpeg") => return "jpg".to_string(),
        Some("image/svg+xml") => return "svg".to_string(),
        Some(other) if other.starts_with("image/") => {
            if let Some(ext) = mime_guess::get_mime_extensions_str(other).and_then(|e| e.first()) {
                return ext.to_string();
            }
        }
        _ => {}
    }
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| mime_guess::from_ext(ext).first().is_some_and(|m| m.type_().as_str() == "image"))
        .unwrap_or_else(|| FALLBACK_IMAGE_EXTENSION.to_string())
}

#[async_trait]
impl DocumentRenderer for TypstRenderer {
    async fn render(&self, tree: &DocumentTree) -> Result<Vec<u8>, RenderError> {
        let workspace = tempdir().map_err(RenderError::Io)?;
        let dir = workspace.path();

        let sources = tree.image_sources();
        let fetched = join_all(
            sources
                .iter()
                .enumerate()
                .map(|(index, url)| self.fetch_image(url, index, dir)),
        )
        .await;

        let mut images = ImageMap::new();
        for (url, result) in sources.iter().zip(fetched) {
            images.insert(url.to_string(), result?);
        }

        tokio::fs::write(dir.join(SOURCE_FILE), to_typst(tree, &images))
            .await
            .map_err(RenderError::Io)?;

        let output = Command::new(&self.typst_bin)
            .arg("compile")
            .arg(SOURCE_FILE)
            .arg(OUTPUT_FILE)
            .current_dir(dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(RenderError::Compiler)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("typst compile failed: {}", stderr);
            return Err(RenderError::CompilerExit {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        tokio::fs::read(dir.join(OUTPUT_FILE))
            .await
            .map_err(RenderError::Io)
    }
}
