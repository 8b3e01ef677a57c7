//! handlers/scenario_handler.rs
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::handlers::error_response;
use crate::models::scenario_model::{AnalyzeScenarioRequest, ScenarioFeedbackRequest};
use crate::services::scenario_service::ScenarioService;

/// POST /api/scenarios/train
pub async fn train_scenario_endpoint(
    service: web::Data<ScenarioService>,
    body: web::Json<AnalyzeScenarioRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    match service
        .train(&req.input_text, req.additional_context.as_deref())
        .await
    {
        Ok(training) => HttpResponse::Created().json(json!({
            "success": true,
            "message": "Scenario analyzed and saved successfully!",
            "scenario": training
        })),
        Err(e) => error_response(e),
    }
}

/// GET /api/scenarios
pub async fn list_scenarios_endpoint(service: web::Data<ScenarioService>) -> HttpResponse {
    match service.list_scenarios().await {
        Ok(scenarios) => HttpResponse::Ok().json(scenarios),
        Err(e) => error_response(e),
    }
}

/// POST /api/scenarios/analyze
/// Igual que train pero sin guardar nada.
pub async fn analyze_scenario_endpoint(
    service: web::Data<ScenarioService>,
    body: web::Json<AnalyzeScenarioRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    match service
        .analyze_with_strategy(&req.input_text, req.additional_context.as_deref())
        .await
    {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            log::error!("Error analizando escenario: {:?}", e);
            HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": format!("Could not analyze scenario: {:#}", e)
            }))
        }
    }
}

/// POST /api/scenarios/{id}/feedback
pub async fn scenario_feedback_endpoint(
    service: web::Data<ScenarioService>,
    path: web::Path<String>,
    body: web::Json<ScenarioFeedbackRequest>,
) -> HttpResponse {
    match service
        .learn_from_feedback(&path.into_inner(), body.into_inner().success_metrics)
        .await
    {
        Ok(training) => HttpResponse::Ok().json(json!({
            "success": true,
            "scenario": training
        })),
        Err(e) => error_response(e),
    }
}
