//! tests/handler_tests.rs
//! Rutas HTTP de punta a punta con SQLite en memoria y generador falso.

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::app::init_app;
    use crate::config::app_config::SenderProfile;
    use crate::models::campaign_model::{CampaignStatus, NewCampaign};
    use crate::services::{
        activity_service::ActivityService,
        automation_service::{AutomationController, DriverDeps},
        campaign_service::CampaignService,
        draft_service::DraftService,
        outreach_store::SqliteOutreachStore,
        scenario_service::ScenarioService,
        stats_service::StatsService,
        template_service::TemplateService,
    };
    use crate::tests::support::{collateral, memory_pool, test_settings, FakeGenerator, FakeMailer};

    macro_rules! test_app {
        ($pool:expr, $files:expr) => {{
            let pool = $pool;
            let generator = Arc::new(FakeGenerator::always("Generated text"));
            let templates = TemplateService::new(pool.clone());
            let campaigns = CampaignService::new(pool.clone());
            let activity = ActivityService::new(pool.clone());
            let stats = StatsService::new(pool.clone());
            let store = SqliteOutreachStore::new(
                campaigns.clone(),
                templates.clone(),
                activity.clone(),
                stats.clone(),
            );
            let controller = AutomationController::new(
                DriverDeps {
                    store: Arc::new(store),
                    generator: generator.clone(),
                    mailer: Arc::new(FakeMailer::default()),
                    collateral: $files,
                    settings: test_settings(20),
                },
                Duration::from_secs(300),
            );
            let drafts = DraftService::new(
                generator.clone(),
                campaigns.clone(),
                templates.clone(),
                SenderProfile::default(),
            );
            test::init_service(
                App::new()
                    .app_data(web::Data::new(templates))
                    .app_data(web::Data::new(campaigns))
                    .app_data(web::Data::new(activity))
                    .app_data(web::Data::new(stats))
                    .app_data(web::Data::new(drafts))
                    .app_data(web::Data::new(ScenarioService::new(pool, generator)))
                    .app_data(web::Data::new(controller))
                    .configure(init_app),
            )
            .await
        }};
    }

    #[actix_rt::test]
    async fn test_template_routes() {
        let (_dir, files) = collateral();
        let app = test_app!(memory_pool().await, files);

        let req = test::TestRequest::post()
            .uri("/api/templates")
            .set_json(json!({
                "name": "Intro",
                "template_content": "Dear {person_name}"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        let id = created["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get().uri("/api/templates").to_request();
        let list: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/templates/{}", id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&format!("/api/templates/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_rt::test]
    async fn test_campaign_create_and_retry() {
        let (_dir, files) = collateral();
        let pool = memory_pool().await;
        let app = test_app!(pool.clone(), files);

        let req = test::TestRequest::post()
            .uri("/api/campaigns")
            .set_json(json!({
                "email": "jane@acme.com",
                "company_name": "Acme",
                "context": "Expiring help desk contract"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let campaign: Value = test::read_body_json(resp).await;
        assert_eq!(campaign["status"], "pending");
        assert_eq!(campaign["subject"], "Generated text");
        let id = campaign["id"].as_str().unwrap().to_string();

        // El driver la marca fallida
        CampaignService::new(pool)
            .update_status(&id, CampaignStatus::Failed, None)
            .await
            .unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/api/campaigns/{}", id))
            .set_json(json!({ "status": "pending" }))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["status"], "pending");
    }

    #[actix_rt::test]
    async fn test_campaign_put_cannot_set_sent_or_failed() {
        let (_dir, files) = collateral();
        let pool = memory_pool().await;
        let app = test_app!(pool.clone(), files);

        let campaign = CampaignService::new(pool)
            .create_campaign(NewCampaign {
                email: "jane@acme.com".to_string(),
                subject: "Intro".to_string(),
                ..NewCampaign::default()
            })
            .await
            .unwrap();

        for status in ["sent", "failed"] {
            let req = test::TestRequest::put()
                .uri(&format!("/api/campaigns/{}", campaign.id))
                .set_json(json!({ "status": status, "subject": "Changed" }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }

        let req = test::TestRequest::get()
            .uri(&format!("/api/campaigns/{}", campaign.id))
            .to_request();
        let stored: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stored["status"], "pending");
        assert_eq!(stored["subject"], "Intro");

        // Sin status se pueden editar los demás campos
        let req = test::TestRequest::put()
            .uri(&format!("/api/campaigns/{}", campaign.id))
            .set_json(json!({ "subject": "Changed" }))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["subject"], "Changed");
        assert_eq!(updated["status"], "pending");
    }

    #[actix_rt::test]
    async fn test_campaign_without_email_is_bad_request() {
        let (_dir, files) = collateral();
        let app = test_app!(memory_pool().await, files);

        let req = test::TestRequest::post()
            .uri("/api/campaigns")
            .set_json(json!({ "email": "  " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_unknown_campaign_is_not_found() {
        let (_dir, files) = collateral();
        let app = test_app!(memory_pool().await, files);

        let req = test::TestRequest::get()
            .uri("/api/campaigns/does-not-exist")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_import_validates_columns() {
        let (_dir, files) = collateral();
        let app = test_app!(memory_pool().await, files);

        let req = test::TestRequest::post()
            .uri("/api/campaigns/import")
            .set_json(json!({ "rows": [{ "company name": "Acme", "email": "a@acme.com" }] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/campaigns/import")
            .set_json(json!({ "rows": [] }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );

        let req = test::TestRequest::post()
            .uri("/api/campaigns/import")
            .set_json(json!({ "rows": [
                { "Company Name": "Acme", "Email": "a@acme.com", "Name": "A" }
            ] }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["created"], 1);
    }

    #[actix_rt::test]
    async fn test_dashboard_and_automation_routes() {
        let (_dir, files) = collateral();
        let app = test_app!(memory_pool().await, files);

        let req = test::TestRequest::get().uri("/api/dashboard").to_request();
        let dashboard: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(dashboard["stats"]["status"], "stopped");
        assert_eq!(dashboard["stats"]["total_emails_processed"], 0);

        let req = test::TestRequest::post()
            .uri("/api/automation/start")
            .to_request();
        let started: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(started["success"], true);
        assert_eq!(started["stats"]["status"], "running");

        let req = test::TestRequest::get()
            .uri("/api/automation/status")
            .to_request();
        let status: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status["running"], true);

        let req = test::TestRequest::post()
            .uri("/api/automation/stop")
            .to_request();
        let stopped: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stopped["stats"]["status"], "stopped");

        let req = test::TestRequest::get().uri("/api/stats").to_request();
        let stats: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats["status"], "stopped");
    }
}
