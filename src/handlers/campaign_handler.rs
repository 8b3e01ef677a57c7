//! handlers/campaign_handler.rs
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::handlers::error_response;
use crate::models::campaign_model::{
    CampaignStatus, CreateCampaignRequest, ImportCampaignsRequest, ImportCampaignsResponse, UpdateCampaignRequest,
};
use crate::services::{campaign_service::CampaignService, draft_service::DraftService};

/// GET /api/campaigns
pub async fn list_campaigns_endpoint(service: web::Data<CampaignService>) -> HttpResponse {
    match service.list_campaigns(None).await {
        Ok(campaigns) => HttpResponse::Ok().json(campaigns),
        Err(e) => error_response(e),
    }
}

/// POST /api/campaigns
/// Subject (si no viene) y cuerpo los redacta la IA antes de guardar.
pub async fn create_campaign_endpoint(
    drafts: web::Data<DraftService>,
    body: web::Json<CreateCampaignRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    if req.email.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "email is required"
        }));
    }

    match drafts.create_campaign(req).await {
        Ok(campaign) => HttpResponse::Created().json(campaign),
        Err(e) => error_response(e),
    }
}

/// GET /api/campaigns/{id}
pub async fn get_campaign_endpoint(
    service: web::Data<CampaignService>,
    path: web::Path<String>,
) -> HttpResponse {
    match service.get_campaign(&path.into_inner()).await {
        Ok(campaign) => HttpResponse::Ok().json(campaign),
        Err(e) => error_response(e),
    }
}

/// PUT /api/campaigns/{id}
/// Permite volver a `pending` una campaña fallida (reintento manual).
pub async fn update_campaign_endpoint(
    service: web::Data<CampaignService>,
    path: web::Path<String>,
    body: web::Json<UpdateCampaignRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    // sent/failed solo los escribe el driver
    if let Some(status) = req.status.filter(|s| *s != CampaignStatus::Pending) {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": format!("Status can only be reset to pending, got {}", status)
        }));
    }

    match service
        .update_campaign(&path.into_inner(), req)
        .await
    {
        Ok(campaign) => HttpResponse::Ok().json(campaign),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/campaigns/{id}
pub async fn delete_campaign_endpoint(
    service: web::Data<CampaignService>,
    path: web::Path<String>,
) -> HttpResponse {
    match service.delete_campaign(&path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Campaign deleted successfully!"
        })),
        Err(e) => error_response(e),
    }
}

/// POST /api/campaigns/import
pub async fn import_campaigns_endpoint(
    drafts: web::Data<DraftService>,
    body: web::Json<ImportCampaignsRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    if req.rows.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "No rows uploaded"
        }));
    }

    match drafts.import_rows(&req.rows).await {
        Ok(created) => HttpResponse::Ok().json(ImportCampaignsResponse {
            success: true,
            created,
            message: format!("Successfully created {} campaign(s)", created),
        }),
        Err(e) if e.to_string().contains("must contain columns") => {
            HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
        Err(e) => error_response(e),
    }
}
