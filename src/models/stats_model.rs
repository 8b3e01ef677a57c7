//! models/stats_model.rs
//! Contadores agregados (fila única) y respuesta de estado del driver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomationStatus {
    Running,
    Stopped,
}

impl AutomationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutomationStatus::Running => "running",
            AutomationStatus::Stopped => "stopped",
        }
    }

    pub fn parse(s: &str) -> Self {
        if s == "running" {
            AutomationStatus::Running
        } else {
            AutomationStatus::Stopped
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub total_emails_processed: i64,
    pub total_responses_sent: i64,
    pub avg_response_time: Option<f64>,
    pub status: AutomationStatus,
    pub last_check: Option<DateTime<Utc>>,
}

impl Default for SystemStats {
    fn default() -> Self {
        SystemStats {
            total_emails_processed: 0,
            total_responses_sent: 0,
            avg_response_time: None,
            status: AutomationStatus::Stopped,
            last_check: None,
        }
    }
}

impl SystemStats {
    /// Registra un envío exitoso. El promedio es `(anterior + muestra) / 2`,
    /// no una media real; los dashboards dependen de este valor exacto.
    pub fn record_sent(&mut self, response_time: f64, now: DateTime<Utc>) {
        self.total_emails_processed += 1;
        self.total_responses_sent += 1;
        self.avg_response_time = Some(match self.avg_response_time {
            Some(avg) => (avg + response_time) / 2.0,
            None => response_time,
        });
        self.last_check = Some(now);
    }

    pub fn record_failed(&mut self, now: DateTime<Utc>) {
        self.total_emails_processed += 1;
        self.last_check = Some(now);
    }
}

/// GET /api/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub total_emails_processed: i64,
    pub total_responses_sent: i64,
    pub avg_response_time: Option<f64>,
    pub status: AutomationStatus,
    pub last_check: Option<String>,
}

impl From<SystemStats> for StatsResponse {
    fn from(stats: SystemStats) -> Self {
        StatsResponse {
            total_emails_processed: stats.total_emails_processed,
            total_responses_sent: stats.total_responses_sent,
            avg_response_time: stats.avg_response_time,
            status: stats.status,
            last_check: stats.last_check.map(|t| t.to_rfc3339()),
        }
    }
}

/// GET /api/automation/status
#[derive(Debug, Clone, Serialize)]
pub struct AutomationStatusResponse {
    pub running: bool,
    pub last_check: Option<String>,
    pub sends_in_window: usize,
    pub stats: StatsResponse,
}
