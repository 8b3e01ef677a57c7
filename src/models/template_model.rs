//! models/template_model.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_VARIABLES_GUIDE: &str = "Available variables:
{company_name} - Name of the company
{industry} - Company's industry
{person_name} - Contact person's name (if available)
{custom_research} - AI-generated company-specific research
{value_prop} - AI-generated value proposition
{pain_point} - AI-identified potential pain point";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub template_content: String,
    pub variables_guide: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body para crear o editar una plantilla (POST / PUT)
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateRequest {
    pub name: String,
    pub description: Option<String>,
    pub template_content: String,
    pub variables_guide: Option<String>,
}
