//! models/campaign_model.rs
//! Campañas de outreach: un intento de contacto por empresa/persona.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Estado de una campaña. Solo el driver la saca de `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Pending,
    Sent,
    Failed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Pending => "pending",
            CampaignStatus::Sent => "sent",
            CampaignStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CampaignStatus::Pending),
            "sent" => Ok(CampaignStatus::Sent),
            "failed" => Ok(CampaignStatus::Failed),
            other => Err(anyhow::anyhow!("Estado de campaña desconocido: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: String,
    pub email: String,
    pub subject: String,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub target_person: Option<String>,
    pub context: Option<String>,
    pub template_id: Option<String>,
    pub status: CampaignStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub generated_content: Option<String>, // cuerpo generado por IA al crear
}

impl CampaignRecord {
    pub fn company_label(&self) -> &str {
        self.company_name.as_deref().unwrap_or_default()
    }
}

/// Datos ya resueltos para insertar (subject y cuerpo generados antes).
#[derive(Debug, Clone, Default)]
pub struct NewCampaign {
    pub email: String,
    pub subject: String,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub target_person: Option<String>,
    pub context: Option<String>,
    pub template_id: Option<String>,
    pub generated_content: Option<String>,
}

/// POST /api/campaigns
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignRequest {
    pub email: String,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub target_person: Option<String>,
    pub context: Option<String>,
    pub template_id: Option<String>,
    /// Si viene, no se le pide el subject a la IA
    pub subject: Option<String>,
}

/// PUT /api/campaigns/{id}. Campos ausentes no se tocan.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCampaignRequest {
    pub email: Option<String>,
    pub subject: Option<String>,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub target_person: Option<String>,
    pub context: Option<String>,
    pub template_id: Option<String>,
    /// Reintento manual: el operador vuelve a poner `pending`
    pub status: Option<CampaignStatus>,
}

/// Fila de importación masiva. Las claves se normalizan (minúsculas, sin espacios extremos).
#[derive(Debug, Clone, Deserialize)]
pub struct ImportCampaignsRequest {
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportCampaignsResponse {
    pub success: bool,
    pub created: usize,
    pub message: String,
}
