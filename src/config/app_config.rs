//! config/app_config.rs
//! Toda la configuración sale de variables de entorno; `dotenv` ya se cargó en main.

use anyhow::{anyhow, Context, Result};
use std::{env, path::PathBuf, time::Duration};

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/outreach.db";

/// Credenciales y servidor SMTP. Cualquiera puede faltar; el driver lo valida por campaña.
#[derive(Debug, Clone, Default)]
pub struct SmtpConfig {
    pub email_address: Option<String>,
    pub email_password: Option<String>,
    pub smtp_server: Option<String>,
    pub smtp_port: u16,
    pub imap_server: String,
    pub timeout: Duration,
}

impl SmtpConfig {
    pub fn is_complete(&self) -> bool {
        self.email_address.is_some() && self.email_password.is_some() && self.smtp_server.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AiConfig {
    pub google_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_model: String,
    pub openai_model: String,
    pub gemini_base_url: String,
    pub openai_base_url: String,
    pub timeout: Duration,
}

impl AiConfig {
    pub fn is_configured(&self) -> bool {
        self.google_api_key.is_some() || self.openai_api_key.is_some()
    }
}

/// Firma y datos del remitente que van en el cuerpo y en el prompt
#[derive(Debug, Clone)]
pub struct SenderProfile {
    pub name: String,
    pub title: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub company: String,
}

impl Default for SenderProfile {
    fn default() -> Self {
        SenderProfile {
            name: "Your Name".to_string(),
            title: "Your Title".to_string(),
            phone: "555-555-5555".to_string(),
            email: "your@email.com".to_string(),
            website: "https://yourcompany.com".to_string(),
            company: "Your Company".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub emails_per_hour: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub poll_interval: Duration,
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_delay > self.max_delay {
            return Err(anyhow!(
                "MIN_DELAY_SECONDS ({:?}) no puede ser mayor que MAX_DELAY_SECONDS ({:?})",
                self.min_delay,
                self.max_delay
            ));
        }
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            emails_per_hour: 20,
            min_delay: Duration::from_secs(60),
            max_delay: Duration::from_secs(180),
            poll_interval: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub smtp: SmtpConfig,
    pub ai: AiConfig,
    pub sender: SenderProfile,
    pub rate_limit: RateLimitConfig,
    pub capabilities_pdf_path: PathBuf,
    pub logo_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let rate_limit = RateLimitConfig {
            emails_per_hour: parse_var("EMAILS_PER_HOUR", 20)?,
            min_delay: Duration::from_secs(parse_var("MIN_DELAY_SECONDS", 60)?),
            max_delay: Duration::from_secs(parse_var("MAX_DELAY_SECONDS", 180)?),
            poll_interval: Duration::from_secs(parse_var("POLL_INTERVAL_SECONDS", 300)?),
        };
        rate_limit.validate()?;

        let smtp = SmtpConfig {
            email_address: optional_var("EMAIL_ADDRESS"),
            email_password: optional_var("EMAIL_PASSWORD"),
            smtp_server: optional_var("SMTP_SERVER"),
            smtp_port: parse_var("SMTP_PORT", 587)?,
            imap_server: var_or("IMAP_SERVER", "imap.gmail.com"),
            timeout: Duration::from_secs(parse_var("SMTP_TIMEOUT_SECONDS", 30)?),
        };

        let ai = AiConfig {
            google_api_key: optional_var("GOOGLE_API_KEY"),
            openai_api_key: optional_var("OPENAI_API_KEY"),
            gemini_model: var_or("GEMINI_MODEL", "gemini-1.5-pro"),
            openai_model: var_or("OPENAI_MODEL", "gpt-4"),
            gemini_base_url: var_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            openai_base_url: var_or("OPENAI_BASE_URL", "https://api.openai.com"),
            timeout: Duration::from_secs(parse_var("AI_TIMEOUT_SECONDS", 60)?),
        };

        let defaults = SenderProfile::default();
        let sender = SenderProfile {
            name: var_or("SENDER_NAME", &defaults.name),
            title: var_or("SENDER_TITLE", &defaults.title),
            phone: var_or("SENDER_PHONE", &defaults.phone),
            email: var_or("SENDER_EMAIL", &defaults.email),
            website: var_or("SENDER_WEBSITE", &defaults.website),
            company: var_or("SENDER_COMPANY", &defaults.company),
        };

        Ok(AppConfig {
            database_url: var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            port: parse_var("PORT", 8080)?,
            smtp,
            ai,
            sender,
            rate_limit,
            capabilities_pdf_path: PathBuf::from(var_or("CAPABILITIES_PDF_PATH", "capabilities.pdf")),
            logo_path: PathBuf::from(var_or("LOGO_PATH", "logo.jpg")),
        })
    }
}

/// Variables vacías cuentan como ausentes
pub(crate) fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub(crate) fn var_or(key: &str, default: &str) -> String {
    optional_var(key).unwrap_or_else(|| default.to_string())
}

pub(crate) fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Valor inválido para {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
