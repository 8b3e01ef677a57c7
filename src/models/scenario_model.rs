//! models/scenario_model.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioTraining {
    pub id: String,
    pub scenario_type: String,
    pub input_text: String,
    pub analysis: Option<Value>,
    pub response_strategy: Option<Value>,
    pub success_metrics: Option<Value>,
    pub learning_insights: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// POST /api/scenarios/train y /api/scenarios/analyze
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeScenarioRequest {
    pub input_text: String,
    pub additional_context: Option<String>,
}

/// POST /api/scenarios/{id}/feedback
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFeedbackRequest {
    pub success_metrics: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioAnalysisResponse {
    pub success: bool,
    pub analysis: Value,
    pub strategy: Value,
}
