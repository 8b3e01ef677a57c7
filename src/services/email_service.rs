//! services/email_service.rs
//! Transporte SMTP (lettre) y armado del mensaje HTML con adjuntos.

use async_trait::async_trait;
use lettre::{
    message::{
        header::{ContentDisposition, ContentType},
        Attachment, Mailbox, MultiPart, SinglePart,
    },
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::config::app_config::{SenderProfile, SmtpConfig};
use crate::errors::OutreachError;

/// Content-ID del logo inline; la firma lo referencia con `cid:`
pub const LOGO_CONTENT_ID: &str = "companylogo";

static SUBJECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    // Línea inicial "Subject: ..." (con o sin dos puntos) seguida de salto de línea
    Regex::new(r"(?i)\A\s*subject\s*:?[^\n]*\n+").expect("regex de subject válida")
});

#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    /// `Some(cid)` para adjuntos inline
    pub content_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<MailAttachment>,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Conecta, autentica y envía. Cualquier fallo es `Transport`.
    async fn send(&self, email: OutboundEmail) -> Result<(), OutreachError>;
}

/// Quita las líneas "Subject:" que la IA a veces repite al principio del cuerpo.
/// Aplicarlo dos veces da el mismo resultado que una.
pub fn strip_subject_line(text: &str) -> String {
    let mut current = text;
    while let Some(m) = SUBJECT_LINE.find(current) {
        current = &current[m.end()..];
    }
    if current.len() == text.len() {
        return text.to_string();
    }
    current.trim_start().to_string()
}

pub fn html_signature(sender: &SenderProfile) -> String {
    format!(
        concat!(
            r#"<br><br><span style="color:#000000;">Best regards,<br>{name}<br>{title}<br>{phone}<br>"#,
            r#"<a href="mailto:{email}" style="color:#000000;">{email}</a></span><br>"#,
            r#"<img src="cid:{cid}" style="max-width:300px;"><br>"#,
            r#"<a href="{website}" style="color:#000000;">{website}</a>"#
        ),
        name = sender.name,
        title = sender.title,
        phone = sender.phone,
        email = sender.email,
        cid = LOGO_CONTENT_ID,
        website = sender.website,
    )
}

/// Saltos de línea a `<br>` y firma al final
pub fn render_html_body(body: &str, sender: &SenderProfile) -> String {
    format!("{}{}", body.replace('\n', "<br>"), html_signature(sender))
}

/// Los dos archivos fijos que acompañan cada email
#[derive(Debug, Clone)]
pub struct CollateralFiles {
    pub capabilities_pdf: PathBuf,
    pub logo: PathBuf,
}

impl CollateralFiles {
    pub fn new(capabilities_pdf: PathBuf, logo: PathBuf) -> Self {
        Self {
            capabilities_pdf,
            logo,
        }
    }

    /// Se leen en cada envío; si falta un archivo el envío falla
    pub async fn load(&self) -> Result<Vec<MailAttachment>, OutreachError> {
        let pdf = tokio::fs::read(&self.capabilities_pdf).await.map_err(|e| {
            OutreachError::Transport(format!(
                "No se pudo leer {:?}: {}",
                self.capabilities_pdf, e
            ))
        })?;
        let logo = tokio::fs::read(&self.logo).await.map_err(|e| {
            OutreachError::Transport(format!("No se pudo leer {:?}: {}", self.logo, e))
        })?;

        Ok(vec![
            MailAttachment {
                filename: file_name(&self.capabilities_pdf, "capabilities.pdf"),
                content_type: "application/pdf".to_string(),
                data: pdf,
                content_id: None,
            },
            MailAttachment {
                filename: file_name(&self.logo, "logo.jpg"),
                content_type: image_content_type(&self.logo).to_string(),
                data: logo,
                content_id: Some(LOGO_CONTENT_ID.to_string()),
            },
        ])
    }
}

fn file_name(path: &std::path::Path, fallback: &str) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| fallback.to_string())
}

fn image_content_type(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// Construye el `Message` MIME: HTML + adjuntos (inline o attachment)
pub fn build_message(from: &str, email: &OutboundEmail) -> Result<Message, OutreachError> {
    let from: Mailbox = from
        .parse()
        .map_err(|e| OutreachError::Transport(format!("Invalid from address: {}", e)))?;
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| OutreachError::Transport(format!("Invalid recipient address: {}", e)))?;

    let html_part = SinglePart::builder()
        .header(ContentType::TEXT_HTML)
        .body(email.html_body.clone());

    let mut multipart = MultiPart::mixed().singlepart(html_part);
    for attach in &email.attachments {
        let content_type = ContentType::parse(&attach.content_type)
            .map_err(|e| OutreachError::Transport(format!("Invalid content type: {}", e)))?;
        let part = match &attach.content_id {
            Some(cid) => Attachment::new_inline(cid.clone()).body(attach.data.clone(), content_type),
            None => SinglePart::builder()
                .header(content_type)
                .header(ContentDisposition::attachment(&attach.filename))
                .body(attach.data.clone()),
        };
        multipart = multipart.singlepart(part);
    }

    Message::builder()
        .from(from)
        .to(to)
        .subject(&email.subject)
        .multipart(multipart)
        .map_err(|e| OutreachError::Transport(format!("Failed to build message: {}", e)))
}

/// Transporte real. Se arma una sesión nueva por envío (STARTTLS + login).
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), OutreachError> {
        let (Some(user), Some(pass), Some(host)) = (
            self.config.email_address.as_ref(),
            self.config.email_password.as_ref(),
            self.config.smtp_server.as_ref(),
        ) else {
            return Err(OutreachError::Configuration(
                "Missing EMAIL_ADDRESS, EMAIL_PASSWORD or SMTP_SERVER".to_string(),
            ));
        };

        let message = build_message(user, &email)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| OutreachError::Transport(format!("SMTP relay {}: {}", host, e)))?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(user.clone(), pass.clone()))
            .timeout(Some(self.config.timeout))
            .build();

        tokio::time::timeout(self.config.timeout, mailer.send(message))
            .await
            .map_err(|_| {
                OutreachError::Transport(format!("SMTP send timed out after {:?}", self.config.timeout))
            })?
            .map_err(|e| OutreachError::Transport(format!("SMTP send failed: {}", e)))?;

        Ok(())
    }
}
