//! tests/support.rs
//! Fakes de los puertos del driver y helpers compartidos.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

use crate::config::app_config::SenderProfile;
use crate::errors::OutreachError;
use crate::models::{
    activity_model::NewActivity,
    campaign_model::{CampaignRecord, CampaignStatus},
    stats_model::{AutomationStatus, SystemStats},
    template_model::EmailTemplate,
};
use crate::services::{
    ai_service::TextGenerator,
    email_service::{CollateralFiles, MailTransport, OutboundEmail},
    outreach_service::DriverSettings,
    outreach_store::OutreachStore,
};

/// Una sola conexión: cada conexión a `sqlite::memory:` es una base distinta
pub async fn memory_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("pool en memoria");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migraciones");
    pool
}

pub fn pending_campaign(email: &str, company: &str) -> CampaignRecord {
    CampaignRecord {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        subject: format!("Hello {}", company),
        company_name: Some(company.to_string()),
        industry: None,
        target_person: Some("Jane".to_string()),
        context: Some("Needs IT support".to_string()),
        template_id: None,
        status: CampaignStatus::Pending,
        sent_at: None,
        created_at: Utc::now(),
        generated_content: None,
    }
}

pub fn test_settings(emails_per_hour: usize) -> DriverSettings {
    DriverSettings {
        emails_per_hour,
        min_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        from_address: "outreach@example.com".to_string(),
        mail_configured: true,
        ai_configured: true,
        sender: SenderProfile::default(),
    }
}

/// PDF y logo reales en un directorio temporal. El `TempDir` debe vivir lo que dure el test.
pub fn collateral() -> (TempDir, CollateralFiles) {
    let dir = tempfile::tempdir().expect("tempdir");
    let pdf = dir.path().join("capabilities.pdf");
    let logo = dir.path().join("logo.jpg");
    std::fs::write(&pdf, b"%PDF-1.4 fake").expect("pdf");
    std::fs::write(&logo, [0xFF, 0xD8, 0xFF, 0xE0]).expect("logo");
    (dir, CollateralFiles::new(pdf, logo))
}

// ------------------------------------------------------------------
// Store
// ------------------------------------------------------------------

#[derive(Default)]
pub struct FakeStore {
    pub campaigns: Mutex<Vec<CampaignRecord>>,
    pub activities: Mutex<Vec<NewActivity>>,
    pub stats: Mutex<SystemStats>,
    pub templates: Vec<EmailTemplate>,
    /// `list_pending` nunca responde (driver colgado)
    pub hang_on_list: bool,
    /// Demora al escribir `running`
    pub running_write_delay: Option<Duration>,
    /// `set_automation_status` falla al escribir `running`
    pub fail_running_write: bool,
}

impl FakeStore {
    pub fn with_campaigns(campaigns: Vec<CampaignRecord>) -> Self {
        Self {
            campaigns: Mutex::new(campaigns),
            ..Self::default()
        }
    }

    pub fn status_of(&self, id: &str) -> CampaignStatus {
        self.campaigns
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.status)
            .expect("campaña existente")
    }

    pub fn activities(&self) -> Vec<NewActivity> {
        self.activities.lock().unwrap().clone()
    }

    pub fn stats(&self) -> SystemStats {
        self.stats.lock().unwrap().clone()
    }
}

#[async_trait]
impl OutreachStore for FakeStore {
    async fn list_pending(&self) -> Result<Vec<CampaignRecord>> {
        if self.hang_on_list {
            std::future::pending::<()>().await;
        }
        Ok(self
            .campaigns
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.status == CampaignStatus::Pending)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: &str,
        status: CampaignStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut campaigns = self.campaigns.lock().unwrap();
        if let Some(c) = campaigns.iter_mut().find(|c| c.id == id) {
            c.status = status;
            if sent_at.is_some() {
                c.sent_at = sent_at;
            }
        }
        Ok(())
    }

    async fn append_activity(&self, activity: NewActivity) -> Result<()> {
        self.activities.lock().unwrap().push(activity);
        Ok(())
    }

    async fn get_or_create_stats(&self) -> Result<SystemStats> {
        Ok(self.stats())
    }

    async fn save_stats(&self, stats: &SystemStats) -> Result<()> {
        let mut current = self.stats.lock().unwrap();
        let status = current.status;
        *current = stats.clone();
        current.status = status;
        Ok(())
    }

    async fn set_automation_status(&self, status: AutomationStatus) -> Result<SystemStats> {
        if status == AutomationStatus::Running {
            if let Some(delay) = self.running_write_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_running_write {
                return Err(anyhow::anyhow!("database is locked"));
            }
        }
        let mut current = self.stats.lock().unwrap();
        current.status = status;
        current.last_check = Some(Utc::now());
        Ok(current.clone())
    }

    async fn list_templates(&self) -> Result<Vec<EmailTemplate>> {
        Ok(self.templates.clone())
    }
}

// ------------------------------------------------------------------
// Generador de texto
// ------------------------------------------------------------------

/// Devuelve respuestas en orden; cuando se acaban usa `fallback`.
/// Sin fallback, la llamada falla con `ContentGeneration`.
#[derive(Default)]
pub struct FakeGenerator {
    scripted: Mutex<VecDeque<String>>,
    fallback: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn always(reply: &str) -> Self {
        Self {
            fallback: Some(reply.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn scripted(replies: &[&str]) -> Self {
        Self {
            scripted: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, OutreachError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = self.scripted.lock().unwrap().pop_front() {
            return Ok(reply);
        }
        self.fallback
            .clone()
            .ok_or_else(|| OutreachError::ContentGeneration("provider unavailable".to_string()))
    }
}

// ------------------------------------------------------------------
// Transporte
// ------------------------------------------------------------------

#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<OutboundEmail>>,
    pub fail: bool,
}

impl FakeMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for FakeMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), OutreachError> {
        if self.fail {
            return Err(OutreachError::Transport("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}
