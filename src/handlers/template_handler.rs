//! handlers/template_handler.rs
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::handlers::error_response;
use crate::models::template_model::TemplateRequest;
use crate::services::template_service::TemplateService;

/// GET /api/templates
pub async fn list_templates_endpoint(service: web::Data<TemplateService>) -> HttpResponse {
    match service.list_templates().await {
        Ok(templates) => HttpResponse::Ok().json(templates),
        Err(e) => error_response(e),
    }
}

/// POST /api/templates
pub async fn create_template_endpoint(
    service: web::Data<TemplateService>,
    body: web::Json<TemplateRequest>,
) -> HttpResponse {
    match service.create_template(body.into_inner()).await {
        Ok(template) => HttpResponse::Created().json(template),
        Err(e) => error_response(e),
    }
}

/// GET /api/templates/{id}
pub async fn get_template_endpoint(
    service: web::Data<TemplateService>,
    path: web::Path<String>,
) -> HttpResponse {
    match service.get_template(&path.into_inner()).await {
        Ok(template) => HttpResponse::Ok().json(template),
        Err(e) => error_response(e),
    }
}

/// PUT /api/templates/{id}
pub async fn update_template_endpoint(
    service: web::Data<TemplateService>,
    path: web::Path<String>,
    body: web::Json<TemplateRequest>,
) -> HttpResponse {
    match service
        .update_template(&path.into_inner(), body.into_inner())
        .await
    {
        Ok(template) => HttpResponse::Ok().json(template),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/templates/{id}
pub async fn delete_template_endpoint(
    service: web::Data<TemplateService>,
    path: web::Path<String>,
) -> HttpResponse {
    match service.delete_template(&path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Template deleted"
        })),
        Err(e) => error_response(e),
    }
}
