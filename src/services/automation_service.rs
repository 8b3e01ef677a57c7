//! services/automation_service.rs
//! Controla el único driver en ejecución: start / stop / status.
//!
//! Nunca hay dos drivers vivos a la vez: antes de arrancar uno nuevo se
//! cancela el anterior y se espera con timeout. Si no termina se aborta la
//! tarea y se suelta el handle.

use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::stats_model::{
    AutomationStatus, AutomationStatusResponse, StatsResponse, SystemStats,
};
use crate::services::{
    ai_service::TextGenerator,
    email_service::{CollateralFiles, MailTransport},
    outreach_service::{lock_window, DriverSettings, OutreachDriver},
    outreach_store::OutreachStore,
    rate_limiter::RateWindow,
};

/// Espera máxima por el driver anterior al hacer start
pub const RESTART_JOIN_TIMEOUT: Duration = Duration::from_secs(5);
/// Espera máxima al hacer stop
pub const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Todo lo necesario para construir un driver nuevo en cada start
#[derive(Clone)]
pub struct DriverDeps {
    pub store: Arc<dyn OutreachStore>,
    pub generator: Arc<dyn TextGenerator>,
    pub mailer: Arc<dyn MailTransport>,
    pub collateral: CollateralFiles,
    pub settings: DriverSettings,
}

impl DriverDeps {
    fn build_driver(&self) -> OutreachDriver {
        OutreachDriver::new(
            self.store.clone(),
            self.generator.clone(),
            self.mailer.clone(),
            self.collateral.clone(),
            self.settings.clone(),
        )
    }
}

struct RunningDriver {
    stop: CancellationToken,
    handle: JoinHandle<()>,
    window: Arc<Mutex<RateWindow>>,
}

pub struct AutomationController {
    deps: DriverDeps,
    poll_interval: Duration,
    restart_timeout: Duration,
    stop_timeout: Duration,
    current: tokio::sync::Mutex<Option<RunningDriver>>,
}

impl AutomationController {
    pub fn new(deps: DriverDeps, poll_interval: Duration) -> Self {
        Self {
            deps,
            poll_interval,
            restart_timeout: RESTART_JOIN_TIMEOUT,
            stop_timeout: STOP_JOIN_TIMEOUT,
            current: tokio::sync::Mutex::new(None),
        }
    }

    pub fn with_join_timeouts(mut self, restart: Duration, stop: Duration) -> Self {
        self.restart_timeout = restart;
        self.stop_timeout = stop;
        self
    }

    /// Arranca un driver nuevo (ventana de rate limit vacía).
    /// El lock del handle se mantiene hasta escribir el status, así un stop
    /// concurrente no puede quedar en medio.
    pub async fn start(&self) -> Result<SystemStats> {
        let mut current = self.current.lock().await;

        if let Some(previous) = current.take() {
            if !previous.handle.is_finished() {
                log::warn!("(start) Ya hay un driver corriendo, deteniéndolo primero");
            }
            shutdown(previous, self.restart_timeout).await;
        }

        let driver = self.deps.build_driver();
        let stop = driver.stop_token();
        let window = driver.window();
        let poll_interval = self.poll_interval;

        let handle = tokio::spawn(async move {
            driver.run_automation(poll_interval).await;
        });
        let running = RunningDriver {
            stop,
            handle,
            window,
        };

        match self
            .deps
            .store
            .set_automation_status(AutomationStatus::Running)
            .await
        {
            Ok(stats) => {
                *current = Some(running);
                log::info!("(start) Sistema de automatización iniciado");
                Ok(stats)
            }
            Err(e) => {
                log::error!("(start) No se pudo guardar el status, se detiene el driver: {:#}", e);
                shutdown(running, self.stop_timeout).await;
                Err(e)
            }
        }
    }

    pub async fn stop(&self) -> Result<SystemStats> {
        let mut current = self.current.lock().await;

        match current.take() {
            Some(running) => {
                log::info!("(stop) Enviando señal de stop al driver...");
                shutdown(running, self.stop_timeout).await;
            }
            None => log::info!("(stop) No había driver corriendo"),
        }

        let stats = self
            .deps
            .store
            .set_automation_status(AutomationStatus::Stopped)
            .await?;
        drop(current);
        log::info!("(stop) Status actualizado a stopped");
        Ok(stats)
    }

    pub async fn is_running(&self) -> bool {
        self.current
            .lock()
            .await
            .as_ref()
            .map(|r| !r.handle.is_finished())
            .unwrap_or(false)
    }

    pub async fn status(&self) -> Result<AutomationStatusResponse> {
        let (running, sends_in_window) = {
            let current = self.current.lock().await;
            match current.as_ref() {
                Some(r) => (
                    !r.handle.is_finished(),
                    lock_window(&r.window).active_count(),
                ),
                None => (false, 0),
            }
        };

        let stats = self.deps.store.get_or_create_stats().await?;
        Ok(AutomationStatusResponse {
            running,
            last_check: stats.last_check.map(|t| t.to_rfc3339()),
            sends_in_window,
            stats: StatsResponse::from(stats),
        })
    }
}

/// Cancela y espera. Devuelve false si hubo que abortar la tarea.
async fn shutdown(mut running: RunningDriver, timeout: Duration) -> bool {
    running.stop.cancel();
    match tokio::time::timeout(timeout, &mut running.handle).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            log::error!("(shutdown) La tarea del driver terminó con error: {}", e);
            true
        }
        Err(_) => {
            log::warn!(
                "(shutdown) El driver no terminó en {:?}, se aborta y se descarta",
                timeout
            );
            running.handle.abort();
            false
        }
    }
}
