//! errors.rs
//! Errores tipados del driver de outreach. Configuración, generación y
//! transporte marcan la campaña `failed`. El rate limit deja la pasada en
//! pausa y `Storage` corta la pasada actual.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutreachError {
    /// Faltan credenciales de SMTP o de la IA
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Content generation failed: {0}")]
    ContentGeneration(String),

    /// Fallo de red, autenticación, envío o lectura de adjuntos
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Hourly send limit reached")]
    RateLimitExceeded,

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl From<sqlx::Error> for OutreachError {
    fn from(e: sqlx::Error) -> Self {
        OutreachError::Storage(anyhow::Error::new(e))
    }
}
