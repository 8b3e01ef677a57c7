//! services/rate_limiter.rs
//! Ventana deslizante de 60 minutos con los envíos exitosos.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

pub const RATE_WINDOW: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct RateWindow {
    sent: VecDeque<Instant>,
    per_hour: usize,
}

impl RateWindow {
    pub fn new(per_hour: usize) -> Self {
        Self {
            sent: VecDeque::with_capacity(per_hour),
            per_hour,
        }
    }

    pub fn per_hour(&self) -> usize {
        self.per_hour
    }

    /// Poda y responde si queda cupo. Nunca agrega entradas.
    pub fn check(&mut self) -> bool {
        self.check_at(Instant::now())
    }

    pub fn check_at(&mut self, now: Instant) -> bool {
        self.prune(now);
        self.sent.len() < self.per_hour
    }

    pub fn record(&mut self) {
        self.record_at(Instant::now());
    }

    pub fn record_at(&mut self, at: Instant) {
        self.sent.push_back(at);
    }

    /// Envíos dentro de la ventana, después de podar
    pub fn active_count(&mut self) -> usize {
        self.prune(Instant::now());
        self.sent.len()
    }

    fn prune(&mut self, now: Instant) {
        while let Some(oldest) = self.sent.front() {
            if now.saturating_duration_since(*oldest) >= RATE_WINDOW {
                self.sent.pop_front();
            } else {
                break;
            }
        }
    }
}
