//! Transactional email with the rendered document attached.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;

use super::DistributionError;
use crate::config::{CompanyIdentity, EmailConfig};
use crate::documents::model::DocumentKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachment_name: String,
    pub attachment: Vec<u8>,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), DistributionError>;
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Subject and body for a document of the given kind.
pub fn compose_email(
    kind: DocumentKind,
    reference: &str,
    recipient_name: &str,
    company: &CompanyIdentity,
    to: &str,
    attachment_name: &str,
    attachment: Vec<u8>,
) -> EmailMessage {
    let (subject, intro) = match kind {
        DocumentKind::Quote => (
            format!("Cotización N° {reference} - {}", company.trade_name),
            "Adjuntamos la cotización solicitada. La disponibilidad de los equipos será confirmada por nuestro equipo.",
        ),
        DocumentKind::OrderContract => (
            format!("Contrato de arriendo N° {reference} - {}", company.trade_name),
            "Adjuntamos el contrato de arriendo de su pedido. Por favor revíselo antes del retiro de los equipos.",
        ),
        DocumentKind::ProcessingConfirmation => (
            format!("Confirmación de pedido N° {reference} - {}", company.trade_name),
            "Su pedido fue recibido y se encuentra en proceso. Adjuntamos la confirmación con el detalle.",
        ),
        DocumentKind::CustomerContract => (
            format!("Contrato de cliente - {}", company.trade_name),
            "Adjuntamos su contrato marco de arriendo de equipos.",
        ),
    };

    let html = format!(
        "<p>Hola {},</p><p>{}</p><p>Ante cualquier duda puede escribirnos a {} o llamarnos al {}.</p><p>{}</p>",
        html_escape(recipient_name),
        intro,
        html_escape(&company.email),
        html_escape(&company.phone),
        html_escape(&company.trade_name),
    );

    EmailMessage {
        to: to.to_string(),
        subject,
        html,
        attachment_name: attachment_name.to_string(),
        attachment,
    }
}

#[derive(Serialize)]
struct EmailAttachment<'a> {
    filename: &'a str,
    content: String,
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    attachments: Vec<EmailAttachment<'a>>,
}

/// JSON email API client.
pub struct HttpEmailSender {
    client: reqwest::Client,
    config: EmailConfig,
}

impl HttpEmailSender {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DistributionError> {
        let payload = EmailPayload {
            from: &self.config.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
            attachments: vec![EmailAttachment {
                filename: &message.attachment_name,
                content: BASE64.encode(&message.attachment),
            }],
        };

        let mut builder = self.client.post(&self.config.api_url).json(&payload);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| DistributionError::Email(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(DistributionError::Email(format!("email rejected ({status}): {text}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_escapes_recipient_name() {
        let message = compose_email(
            DocumentKind::Quote,
            "1042",
            "Ana <b>Soto</b>",
            &CompanyIdentity::default(),
            "ana@example.cl",
            "cotizacion-1042.pdf",
            b"%PDF-1.7".to_vec(),
        );
        assert!(message.subject.starts_with("Cotización N° 1042"));
        assert!(message.html.contains("Ana &lt;b&gt;Soto&lt;/b&gt;"));
        assert_eq!(message.attachment_name, "cotizacion-1042.pdf");
    }
}
