//! models/activity_model.rs
//! Log append-only de intentos de envío.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: String,
    pub email_from: String,
    pub email_to: String,
    pub subject: Option<String>,
    pub context: Option<String>,
    pub company_name: Option<String>,
    /// Segundos. `None` cuando el envío falló.
    pub response_time: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub email_from: String,
    pub email_to: String,
    pub subject: String,
    pub company_name: String,
    pub response_time: Option<f64>,
}
