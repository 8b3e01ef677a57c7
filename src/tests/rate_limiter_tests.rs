//! tests/rate_limiter_tests.rs

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tokio::time::Instant;

    use crate::services::rate_limiter::{RateWindow, RATE_WINDOW};

    #[tokio::test]
    async fn test_check_never_records() {
        let mut window = RateWindow::new(2);
        assert!(window.check());
        assert!(window.check());
        assert_eq!(window.active_count(), 0);
    }

    #[tokio::test]
    async fn test_cap_is_enforced_within_the_hour() {
        let now = Instant::now();
        let mut window = RateWindow::new(3);

        for i in 0..3 {
            assert!(window.check_at(now + Duration::from_secs(i)));
            window.record_at(now + Duration::from_secs(i));
        }
        assert!(!window.check_at(now + Duration::from_secs(10)));
        assert!(!window.check_at(now + Duration::from_secs(59 * 60)));
    }

    #[tokio::test]
    async fn test_entries_expire_after_exactly_one_hour() {
        let start = Instant::now();
        let mut window = RateWindow::new(1);
        window.record_at(start);

        assert!(!window.check_at(start + RATE_WINDOW - Duration::from_millis(1)));
        assert!(window.check_at(start + RATE_WINDOW));
    }

    #[tokio::test]
    async fn test_pruning_is_oldest_first() {
        let start = Instant::now();
        let mut window = RateWindow::new(2);
        window.record_at(start);
        window.record_at(start + Duration::from_secs(30 * 60));

        // Solo expiró el primero
        assert!(window.check_at(start + RATE_WINDOW + Duration::from_secs(1)));
        window.record_at(start + RATE_WINDOW + Duration::from_secs(1));
        assert!(!window.check_at(start + RATE_WINDOW + Duration::from_secs(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_count_follows_the_clock() {
        let mut window = RateWindow::new(5);
        window.record();
        window.record();
        assert_eq!(window.active_count(), 2);

        tokio::time::advance(RATE_WINDOW).await;
        assert_eq!(window.active_count(), 0);
        assert_eq!(window.per_hour(), 5);
    }

    #[tokio::test]
    async fn test_zero_cap_never_allows() {
        let mut window = RateWindow::new(0);
        assert!(!window.check());
    }
}
