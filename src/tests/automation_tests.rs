//! tests/automation_tests.rs
//! Controlador start/stop: un solo driver vivo y estado persistido.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::models::campaign_model::CampaignStatus;
    use crate::models::stats_model::AutomationStatus;
    use crate::services::automation_service::{AutomationController, DriverDeps};
    use crate::tests::support::{
        collateral, pending_campaign, test_settings, FakeGenerator, FakeMailer, FakeStore,
    };

    fn controller(store: Arc<FakeStore>) -> (tempfile::TempDir, AutomationController) {
        let (dir, files) = collateral();
        let deps = DriverDeps {
            store,
            generator: Arc::new(FakeGenerator::always("Body")),
            mailer: Arc::new(FakeMailer::default()),
            collateral: files,
            settings: test_settings(20),
        };
        let controller = AutomationController::new(deps, Duration::from_secs(300))
            .with_join_timeouts(Duration::from_millis(200), Duration::from_millis(200));
        (dir, controller)
    }

    #[tokio::test]
    async fn test_start_and_stop_update_status() {
        let store = Arc::new(FakeStore::default());
        let (_dir, controller) = controller(store.clone());

        let stats = controller.start().await.expect("start");
        assert_eq!(stats.status, AutomationStatus::Running);
        assert!(controller.is_running().await);

        let status = controller.status().await.expect("status");
        assert!(status.running);
        assert_eq!(status.stats.status, AutomationStatus::Running);

        let stats = controller.stop().await.expect("stop");
        assert_eq!(stats.status, AutomationStatus::Stopped);
        assert!(!controller.is_running().await);
        assert_eq!(store.stats().status, AutomationStatus::Stopped);
    }

    #[tokio::test]
    async fn test_started_driver_processes_pending_campaigns() {
        let campaign = pending_campaign("a@acme.com", "Acme");
        let id = campaign.id.clone();
        let store = Arc::new(FakeStore::with_campaigns(vec![campaign]));
        let (_dir, controller) = controller(store.clone());

        controller.start().await.expect("start");
        for _ in 0..50 {
            if store.status_of(&id) != CampaignStatus::Pending {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(store.status_of(&id), CampaignStatus::Sent);

        let status = controller.status().await.expect("status");
        assert_eq!(status.sends_in_window, 1);
        controller.stop().await.expect("stop");
    }

    #[tokio::test]
    async fn test_restart_replaces_running_driver() {
        let store = Arc::new(FakeStore::default());
        let (_dir, controller) = controller(store.clone());

        controller.start().await.expect("first start");
        controller.start().await.expect("second start");
        assert!(controller.is_running().await);
        assert_eq!(store.stats().status, AutomationStatus::Running);

        controller.stop().await.expect("stop");
        assert!(!controller.is_running().await);
    }

    #[tokio::test]
    async fn test_stop_without_driver_is_noop() {
        let store = Arc::new(FakeStore::default());
        let (_dir, controller) = controller(store.clone());

        let stats = controller.stop().await.expect("stop");
        assert_eq!(stats.status, AutomationStatus::Stopped);
        assert!(!controller.status().await.expect("status").running);
    }

    #[tokio::test]
    async fn test_unresponsive_driver_is_aborted_on_stop() {
        let store = Arc::new(FakeStore {
            hang_on_list: true,
            ..FakeStore::default()
        });
        let (_dir, controller) = controller(store.clone());

        controller.start().await.expect("start");
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(2), controller.stop())
            .await
            .expect("stop no debe colgarse")
            .expect("stop");
        assert!(!controller.is_running().await);
        assert_eq!(store.stats().status, AutomationStatus::Stopped);
    }

    #[tokio::test]
    async fn test_stop_during_start_leaves_status_stopped() {
        let store = Arc::new(FakeStore {
            running_write_delay: Some(Duration::from_millis(300)),
            ..FakeStore::default()
        });
        let (_dir, controller) = controller(store.clone());
        let controller = Arc::new(controller);

        let starter = controller.clone();
        let start = tokio::spawn(async move { starter.start().await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        controller.stop().await.expect("stop");
        start.await.expect("join").expect("start");

        assert!(!controller.is_running().await);
        assert_eq!(store.stats().status, AutomationStatus::Stopped);
    }

    #[tokio::test]
    async fn test_failed_status_write_on_start_stops_new_driver() {
        let store = Arc::new(FakeStore {
            fail_running_write: true,
            ..FakeStore::default()
        });
        let (_dir, controller) = controller(store.clone());

        assert!(controller.start().await.is_err());
        assert!(!controller.is_running().await);
        assert!(!controller.status().await.expect("status").running);
        assert_eq!(store.stats().status, AutomationStatus::Stopped);
    }
}
