//! services/outreach_store.rs
//! Puerto de persistencia que usa el driver y su implementación SQLite.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    activity_model::NewActivity,
    campaign_model::{CampaignRecord, CampaignStatus},
    stats_model::{AutomationStatus, SystemStats},
    template_model::EmailTemplate,
};
use crate::services::{
    activity_service::ActivityService, campaign_service::CampaignService,
    stats_service::StatsService, template_service::TemplateService,
};

#[async_trait]
pub trait OutreachStore: Send + Sync {
    async fn list_pending(&self) -> Result<Vec<CampaignRecord>>;
    async fn update_status(
        &self,
        id: &str,
        status: CampaignStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<()>;
    async fn append_activity(&self, activity: NewActivity) -> Result<()>;
    async fn get_or_create_stats(&self) -> Result<SystemStats>;
    async fn save_stats(&self, stats: &SystemStats) -> Result<()>;
    /// Transición running/stopped desde el controlador
    async fn set_automation_status(&self, status: AutomationStatus) -> Result<SystemStats>;
    /// Catálogo de plantillas para el prompt
    async fn list_templates(&self) -> Result<Vec<EmailTemplate>>;
}

#[derive(Clone, Debug)]
pub struct SqliteOutreachStore {
    campaigns: CampaignService,
    templates: TemplateService,
    activity: ActivityService,
    stats: StatsService,
}

impl SqliteOutreachStore {
    pub fn new(
        campaigns: CampaignService,
        templates: TemplateService,
        activity: ActivityService,
        stats: StatsService,
    ) -> Self {
        Self {
            campaigns,
            templates,
            activity,
            stats,
        }
    }
}

#[async_trait]
impl OutreachStore for SqliteOutreachStore {
    async fn list_pending(&self) -> Result<Vec<CampaignRecord>> {
        self.campaigns.list_pending().await
    }

    async fn update_status(
        &self,
        id: &str,
        status: CampaignStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.campaigns.update_status(id, status, sent_at).await
    }

    async fn append_activity(&self, activity: NewActivity) -> Result<()> {
        self.activity.append_activity(activity).await
    }

    async fn get_or_create_stats(&self) -> Result<SystemStats> {
        self.stats.get_or_create().await
    }

    async fn save_stats(&self, stats: &SystemStats) -> Result<()> {
        self.stats.save(stats).await
    }

    async fn set_automation_status(&self, status: AutomationStatus) -> Result<SystemStats> {
        self.stats.set_status(status).await
    }

    async fn list_templates(&self) -> Result<Vec<EmailTemplate>> {
        // El prompt las enumera en orden de creación
        let mut templates = self.templates.list_templates().await?;
        templates.reverse();
        Ok(templates)
    }
}
