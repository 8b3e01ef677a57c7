//! app.rs
use crate::handlers::{
    automation_handler, campaign_handler, dashboard_handler, scenario_handler, template_handler,
};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route(
                "/dashboard",
                web::get().to(dashboard_handler::dashboard_endpoint),
            )
            .route("/stats", web::get().to(dashboard_handler::stats_endpoint))
            .route(
                "/activities",
                web::get().to(dashboard_handler::list_activities_endpoint),
            )
            .service(
                web::scope("/templates")
                    .route(
                        "",
                        web::get().to(template_handler::list_templates_endpoint),
                    )
                    .route(
                        "",
                        web::post().to(template_handler::create_template_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::get().to(template_handler::get_template_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::put().to(template_handler::update_template_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::delete().to(template_handler::delete_template_endpoint),
                    ),
            )
            .service(
                web::scope("/campaigns")
                    .route(
                        "",
                        web::get().to(campaign_handler::list_campaigns_endpoint),
                    )
                    .route(
                        "",
                        web::post().to(campaign_handler::create_campaign_endpoint),
                    )
                    // antes que /{id} para que "import" no se tome como id
                    .route(
                        "/import",
                        web::post().to(campaign_handler::import_campaigns_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::get().to(campaign_handler::get_campaign_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::put().to(campaign_handler::update_campaign_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::delete().to(campaign_handler::delete_campaign_endpoint),
                    ),
            )
            .service(
                web::scope("/automation")
                    .route(
                        "/start",
                        web::post().to(automation_handler::start_automation_endpoint),
                    )
                    .route(
                        "/stop",
                        web::post().to(automation_handler::stop_automation_endpoint),
                    )
                    .route(
                        "/status",
                        web::get().to(automation_handler::automation_status_endpoint),
                    ),
            )
            .service(
                web::scope("/scenarios")
                    .route(
                        "",
                        web::get().to(scenario_handler::list_scenarios_endpoint),
                    )
                    .route(
                        "/train",
                        web::post().to(scenario_handler::train_scenario_endpoint),
                    )
                    .route(
                        "/analyze",
                        web::post().to(scenario_handler::analyze_scenario_endpoint),
                    )
                    .route(
                        "/{id}/feedback",
                        web::post().to(scenario_handler::scenario_feedback_endpoint),
                    ),
            ),
    );
}
