//! handlers/dashboard_handler.rs
//! Vistas de solo lectura: dashboard, stats y actividad.

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::handlers::error_response;
use crate::models::stats_model::StatsResponse;
use crate::services::{
    activity_service::ActivityService, campaign_service::CampaignService,
    stats_service::StatsService,
};

const DASHBOARD_ACTIVITIES: i64 = 10;
const DASHBOARD_CAMPAIGNS: i64 = 5;

/// GET /api/dashboard
pub async fn dashboard_endpoint(
    stats: web::Data<StatsService>,
    activity: web::Data<ActivityService>,
    campaigns: web::Data<CampaignService>,
) -> HttpResponse {
    let result = async {
        let stats = stats.get_or_create().await?;
        let activities = activity.list_recent(Some(DASHBOARD_ACTIVITIES)).await?;
        let campaigns = campaigns.list_campaigns(Some(DASHBOARD_CAMPAIGNS)).await?;
        Ok::<_, anyhow::Error>((stats, activities, campaigns))
    }
    .await;

    match result {
        Ok((stats, activities, campaigns)) => HttpResponse::Ok().json(json!({
            "stats": StatsResponse::from(stats),
            "activities": activities,
            "campaigns": campaigns
        })),
        Err(e) => error_response(e),
    }
}

/// GET /api/stats
pub async fn stats_endpoint(stats: web::Data<StatsService>) -> HttpResponse {
    match stats.get_or_create().await {
        Ok(stats) => HttpResponse::Ok().json(StatsResponse::from(stats)),
        Err(e) => error_response(e),
    }
}

/// GET /api/activities
pub async fn list_activities_endpoint(activity: web::Data<ActivityService>) -> HttpResponse {
    match activity.list_recent(None).await {
        Ok(activities) => HttpResponse::Ok().json(activities),
        Err(e) => error_response(e),
    }
}
