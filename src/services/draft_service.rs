//! services/draft_service.rs
//! Alta de campañas desde el front: la IA propone subject y cuerpo.
//! También la importación masiva de filas (planilla subida por el usuario).

use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::app_config::SenderProfile;
use crate::models::campaign_model::{CampaignRecord, CreateCampaignRequest, NewCampaign};
use crate::services::{
    ai_service::TextGenerator,
    campaign_service::CampaignService,
    prompts::{outreach_prompt, subject_prompt, OutreachTarget},
    template_service::TemplateService,
};

pub const MAX_SUBJECT_CHARS: usize = 200;

const COL_COMPANY: &str = "company name";
const COL_EMAIL: &str = "email";
const COL_NAME: &str = "name";
const COL_CONTEXT: &str = "context";
pub const REQUIRED_COLUMNS: [&str; 3] = [COL_COMPANY, COL_EMAIL, COL_NAME];

/// Fila de importación con columnas ya normalizadas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub company_name: String,
    pub email: String,
    pub target_person: String,
    pub context: String,
}

/// Corta en límite de carácter, no de byte
pub fn truncate_subject(subject: &str) -> String {
    subject.trim().chars().take(MAX_SUBJECT_CHARS).collect()
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Normaliza claves (minúsculas, sin espacios extremos) y valida columnas requeridas.
/// Si alguna fila no las tiene se rechaza todo el lote.
pub fn normalize_rows(rows: &[Map<String, Value>]) -> Result<Vec<ImportRow>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let normalized: Map<String, Value> = row
                .iter()
                .map(|(k, v)| (k.trim().to_lowercase(), v.clone()))
                .collect();

            let missing: Vec<&str> = REQUIRED_COLUMNS
                .iter()
                .copied()
                .filter(|c| !normalized.contains_key(*c))
                .collect();
            if !missing.is_empty() {
                return Err(anyhow!(
                    "Row {} must contain columns {:?}; missing {:?}",
                    i + 1,
                    REQUIRED_COLUMNS,
                    missing
                ));
            }

            let get = |col: &str| normalized.get(col).map(cell_to_string).unwrap_or_default();
            Ok(ImportRow {
                company_name: get(COL_COMPANY),
                email: get(COL_EMAIL),
                target_person: get(COL_NAME),
                context: get(COL_CONTEXT),
            })
        })
        .collect()
}

#[derive(Clone)]
pub struct DraftService {
    generator: Arc<dyn TextGenerator>,
    campaigns: CampaignService,
    templates: TemplateService,
    sender: SenderProfile,
}

impl DraftService {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        campaigns: CampaignService,
        templates: TemplateService,
        sender: SenderProfile,
    ) -> Self {
        Self {
            generator,
            campaigns,
            templates,
            sender,
        }
    }

    pub async fn draft_subject(&self, context: &str) -> Result<String> {
        let subject = self
            .generator
            .generate(&subject_prompt(context))
            .await
            .context("Error generando subject con IA")?;
        Ok(truncate_subject(&subject))
    }

    pub async fn draft_body(
        &self,
        company_name: &str,
        context: &str,
        target_person: &str,
        recipient: &str,
    ) -> Result<String> {
        let mut templates = self.templates.list_templates().await?;
        templates.reverse();
        let prompt = outreach_prompt(
            OutreachTarget {
                company_name,
                context,
                target_person,
                recipient,
            },
            &templates,
            &self.sender,
        );
        let body = self
            .generator
            .generate(&prompt)
            .await
            .context("Error generando cuerpo con IA")?;
        Ok(body.trim().to_string())
    }

    pub async fn create_campaign(&self, req: CreateCampaignRequest) -> Result<CampaignRecord> {
        let company = req.company_name.clone().unwrap_or_default();
        let context = req.context.clone().unwrap_or_default();
        let target = req.target_person.clone().unwrap_or_default();

        let subject = match req.subject.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => truncate_subject(s),
            _ => self.draft_subject(&context).await?,
        };
        let body = self
            .draft_body(&company, &context, &target, &req.email)
            .await?;

        let campaign = self
            .campaigns
            .create_campaign(NewCampaign {
                email: req.email,
                subject,
                company_name: req.company_name,
                industry: req.industry,
                target_person: req.target_person,
                context: req.context,
                template_id: req.template_id,
                generated_content: Some(body),
            })
            .await?;

        log::info!(
            "(create_campaign) Campaña {} creada para {}",
            campaign.id,
            campaign.company_label()
        );
        Ok(campaign)
    }

    /// Todo o nada: si falla la IA en una fila no se inserta ninguna
    pub async fn import_rows(&self, rows: &[Map<String, Value>]) -> Result<usize> {
        let rows = normalize_rows(rows)?;
        let mut batch = Vec::with_capacity(rows.len());

        for row in rows {
            let subject = self.draft_subject(&row.context).await?;
            let body = self
                .draft_body(&row.company_name, &row.context, &row.target_person, &row.email)
                .await?;
            batch.push(NewCampaign {
                email: row.email,
                subject,
                company_name: Some(row.company_name),
                industry: None,
                target_person: Some(row.target_person),
                context: Some(row.context),
                template_id: None,
                generated_content: Some(body),
            });
        }

        let created = self.campaigns.create_campaigns(batch).await?;
        log::info!("(import_rows) {} campañas importadas", created);
        Ok(created)
    }
}
