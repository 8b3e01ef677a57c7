//! handlers/mod.rs
//! Módulo que agrupa los distintos handlers (campañas, plantillas, automatización, etc.).

use actix_web::{http::StatusCode, HttpResponse};
use serde_json::json;

pub mod automation_handler;
pub mod campaign_handler;
pub mod dashboard_handler;
pub mod scenario_handler;
pub mod template_handler;

/// 404 si el error viene de una fila inexistente, 500 en otro caso
pub fn error_response(e: anyhow::Error) -> HttpResponse {
    let status_code = if e.to_string().contains("not found") {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    if status_code == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("Error en handler: {:?}", e);
    }

    HttpResponse::build(status_code).json(json!({
        "success": false,
        "error": format!("{:#}", e)
    }))
}
