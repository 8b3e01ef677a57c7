//! handlers/automation_handler.rs
//! Superficie de control del driver: start / stop / status.

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::handlers::error_response;
use crate::models::stats_model::StatsResponse;
use crate::services::automation_service::AutomationController;

/// POST /api/automation/start
pub async fn start_automation_endpoint(
    controller: web::Data<AutomationController>,
) -> HttpResponse {
    match controller.start().await {
        Ok(stats) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Automation system started",
            "stats": StatsResponse::from(stats)
        })),
        Err(e) => error_response(e),
    }
}

/// POST /api/automation/stop
pub async fn stop_automation_endpoint(
    controller: web::Data<AutomationController>,
) -> HttpResponse {
    match controller.stop().await {
        Ok(stats) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Automation system stopped",
            "stats": StatsResponse::from(stats)
        })),
        Err(e) => error_response(e),
    }
}

/// GET /api/automation/status
pub async fn automation_status_endpoint(
    controller: web::Data<AutomationController>,
) -> HttpResponse {
    match controller.status().await {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(e) => error_response(e),
    }
}
