//! services/outreach_service.rs
//! Driver de outreach: recorre campañas pendientes, genera el cuerpo con IA,
//! envía respetando el límite por hora y registra el resultado.
//!
//! Los envíos se serializan: el ritmo lo marca la espera aleatoria después
//! de cada envío exitoso, así que nunca se debe paralelizar `send_email`.

use chrono::Utc;
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::app_config::{AppConfig, SenderProfile};
use crate::errors::OutreachError;
use crate::models::{activity_model::NewActivity, campaign_model::CampaignStatus};
use crate::services::{
    ai_service::TextGenerator,
    email_service::{
        render_html_body, strip_subject_line, CollateralFiles, MailTransport, OutboundEmail,
    },
    outreach_store::OutreachStore,
    prompts::{outreach_prompt, OutreachTarget},
    rate_limiter::RateWindow,
};

/// Tope de espera entre pasadas, sin importar el poll interval pedido
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub emails_per_hour: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Dirección que va en el From y en el log de actividad
    pub from_address: String,
    pub mail_configured: bool,
    pub ai_configured: bool,
    pub sender: SenderProfile,
}

impl DriverSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            emails_per_hour: config.rate_limit.emails_per_hour,
            min_delay: config.rate_limit.min_delay,
            max_delay: config.rate_limit.max_delay,
            from_address: config.smtp.email_address.clone().unwrap_or_default(),
            mail_configured: config.smtp.is_complete(),
            ai_configured: config.ai.is_configured(),
            sender: config.sender.clone(),
        }
    }
}

/// Resultado efímero de un intento de envío
#[derive(Debug)]
pub struct SendAttemptOutcome {
    pub success: bool,
    pub elapsed: Option<Duration>,
    pub error: Option<OutreachError>,
}

impl SendAttemptOutcome {
    fn sent(elapsed: Duration) -> Self {
        Self {
            success: true,
            elapsed: Some(elapsed),
            error: None,
        }
    }

    fn failed(error: OutreachError) -> Self {
        Self {
            success: false,
            elapsed: None,
            error: Some(error),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self.error, Some(OutreachError::RateLimitExceeded))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassAbort {
    Stopped,
    RateLimited,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub found: usize,
    pub sent: usize,
    pub failed: usize,
    pub aborted: Option<PassAbort>,
}

pub struct OutreachDriver {
    store: Arc<dyn OutreachStore>,
    generator: Arc<dyn TextGenerator>,
    mailer: Arc<dyn MailTransport>,
    collateral: CollateralFiles,
    settings: DriverSettings,
    window: Arc<Mutex<RateWindow>>,
    stop: CancellationToken,
}

impl OutreachDriver {
    pub fn new(
        store: Arc<dyn OutreachStore>,
        generator: Arc<dyn TextGenerator>,
        mailer: Arc<dyn MailTransport>,
        collateral: CollateralFiles,
        settings: DriverSettings,
    ) -> Self {
        let window = Arc::new(Mutex::new(RateWindow::new(settings.emails_per_hour)));
        Self {
            store,
            generator,
            mailer,
            collateral,
            settings,
            window,
            stop: CancellationToken::new(),
        }
    }

    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub fn window(&self) -> Arc<Mutex<RateWindow>> {
        self.window.clone()
    }

    pub fn request_stop(&self) {
        self.stop.cancel();
    }

    fn lock_window(&self) -> MutexGuard<'_, RateWindow> {
        lock_window(&self.window)
    }

    /// Poda la ventana y dice si queda cupo en la última hora
    pub fn check_rate_limit(&self) -> bool {
        self.lock_window().check()
    }

    pub async fn generate_content(
        &self,
        company_name: &str,
        context: &str,
        target_person: &str,
        recipient: &str,
    ) -> Result<String, OutreachError> {
        let templates = self
            .store
            .list_templates()
            .await
            .map_err(|e| OutreachError::ContentGeneration(format!("Template catalog: {:#}", e)))?;

        let prompt = outreach_prompt(
            OutreachTarget {
                company_name,
                context,
                target_person,
                recipient,
            },
            &templates,
            &self.settings.sender,
        );
        log::debug!("(generate_content) Prompt de outreach: {}", prompt);

        match self.generator.generate(&prompt).await {
            Ok(text) => {
                log::debug!("(generate_content) Respuesta de la IA: {}", text);
                Ok(text.trim().to_string())
            }
            Err(e) => {
                log::error!("(generate_content) Error generando contenido: {}", e);
                Err(match e {
                    OutreachError::ContentGeneration(_) => e,
                    other => OutreachError::ContentGeneration(other.to_string()),
                })
            }
        }
    }

    pub async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        company_name: &str,
    ) -> SendAttemptOutcome {
        let body = strip_subject_line(body);

        if !self.check_rate_limit() {
            log::warn!("(send_email) Límite por hora alcanzado, no se envía a {}", recipient);
            return SendAttemptOutcome::failed(OutreachError::RateLimitExceeded);
        }

        let started = Instant::now();
        let result = self.deliver(recipient, subject, &body).await;
        let elapsed = started.elapsed();

        match result {
            Ok(()) => {
                self.lock_window().record();
                log::info!(
                    "(send_email) Email enviado a {} en {} ({:.2}s)",
                    recipient,
                    company_name,
                    elapsed.as_secs_f64()
                );

                self.log_activity(recipient, subject, company_name, Some(elapsed.as_secs_f64()))
                    .await;
                self.update_stats(Some(elapsed.as_secs_f64())).await;

                let delay = self.random_delay();
                log::info!(
                    "(send_email) Esperando {} segundos antes del próximo email...",
                    delay.as_secs()
                );
                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = self.stop.cancelled() => {
                        log::info!("(send_email) Stop solicitado durante la espera");
                    }
                }

                SendAttemptOutcome::sent(elapsed)
            }
            Err(e) => {
                log::error!("(send_email) Error enviando email a {}: {}", recipient, e);
                self.log_activity(recipient, subject, company_name, None).await;
                self.update_stats(None).await;
                SendAttemptOutcome::failed(e)
            }
        }
    }

    /// Render + adjuntos + transporte
    async fn deliver(&self, recipient: &str, subject: &str, body: &str) -> Result<(), OutreachError> {
        let attachments = self.collateral.load().await?;
        let email = OutboundEmail {
            to: recipient.to_string(),
            subject: subject.to_string(),
            html_body: render_html_body(body, &self.settings.sender),
            attachments,
        };
        self.mailer.send(email).await
    }

    fn random_delay(&self) -> Duration {
        let min = self.settings.min_delay.as_millis() as u64;
        let max = self.settings.max_delay.as_millis() as u64;
        if max <= min {
            return self.settings.min_delay;
        }
        let millis = rand::thread_rng().gen_range(min..=max);
        Duration::from_millis(millis)
    }

    /// Un fallo al registrar actividad no deshace el envío; solo se loguea
    async fn log_activity(
        &self,
        recipient: &str,
        subject: &str,
        company_name: &str,
        response_time: Option<f64>,
    ) {
        let activity = NewActivity {
            email_from: self.settings.from_address.clone(),
            email_to: recipient.to_string(),
            subject: subject.to_string(),
            company_name: company_name.to_string(),
            response_time,
        };
        if let Err(e) = self.store.append_activity(activity).await {
            log::error!("(log_activity) Error registrando actividad: {:#}", e);
        }
    }

    async fn update_stats(&self, response_time: Option<f64>) {
        let result = async {
            let mut stats = self.store.get_or_create_stats().await?;
            match response_time {
                Some(secs) => stats.record_sent(secs, Utc::now()),
                None => stats.record_failed(Utc::now()),
            }
            self.store.save_stats(&stats).await?;
            log::debug!(
                "(update_stats) processed={}, sent={}, avg={:?}",
                stats.total_emails_processed,
                stats.total_responses_sent,
                stats.avg_response_time
            );
            Ok::<_, anyhow::Error>(())
        }
        .await;

        if let Err(e) = result {
            log::error!("(update_stats) Error actualizando stats: {:#}", e);
        }
    }

    async fn mark(&self, id: &str, status: CampaignStatus) -> Result<(), OutreachError> {
        let sent_at = (status == CampaignStatus::Sent).then(Utc::now);
        self.store.update_status(id, status, sent_at).await?;
        Ok(())
    }

    /// Una pasada sobre todas las campañas pendientes, en orden.
    /// Stop o rate limit cortan la pasada; las que no se alcanzaron siguen `pending`.
    pub async fn process_campaigns(&self) -> Result<PassSummary, OutreachError> {
        let campaigns = self.store.list_pending().await?;
        log::info!("(process_campaigns) {} campañas pendientes", campaigns.len());

        let mut summary = PassSummary {
            found: campaigns.len(),
            ..PassSummary::default()
        };

        for campaign in campaigns {
            if self.stop.is_cancelled() {
                log::info!("(process_campaigns) Stop solicitado, se corta la pasada");
                summary.aborted = Some(PassAbort::Stopped);
                return Ok(summary);
            }

            if !self.check_rate_limit() {
                log::warn!("(process_campaigns) Límite por hora alcanzado, pausa hasta la próxima pasada");
                summary.aborted = Some(PassAbort::RateLimited);
                return Ok(summary);
            }

            log::info!(
                "(process_campaigns) Procesando campaña {} para {} en {}",
                campaign.id,
                campaign.email,
                campaign.company_label()
            );

            if !self.settings.mail_configured {
                log::error!(
                    "(process_campaigns) Falta configuración de email. Revisar EMAIL_ADDRESS, EMAIL_PASSWORD y SMTP_SERVER"
                );
                self.mark(&campaign.id, CampaignStatus::Failed).await?;
                summary.failed += 1;
                continue;
            }
            if !self.settings.ai_configured {
                log::error!(
                    "(process_campaigns) Falta API key de IA. Revisar GOOGLE_API_KEY u OPENAI_API_KEY"
                );
                self.mark(&campaign.id, CampaignStatus::Failed).await?;
                summary.failed += 1;
                continue;
            }

            let content = match self
                .generate_content(
                    campaign.company_label(),
                    campaign.context.as_deref().unwrap_or_default(),
                    campaign.target_person.as_deref().unwrap_or_default(),
                    &campaign.email,
                )
                .await
            {
                Ok(content) => content,
                Err(e) => {
                    log::error!("(process_campaigns) Sin contenido para {}: {}", campaign.id, e);
                    self.mark(&campaign.id, CampaignStatus::Failed).await?;
                    summary.failed += 1;
                    continue;
                }
            };

            let outcome = self
                .send_email(
                    &campaign.email,
                    &campaign.subject,
                    &content,
                    campaign.company_label(),
                )
                .await;

            if outcome.is_rate_limited() {
                summary.aborted = Some(PassAbort::RateLimited);
                return Ok(summary);
            }

            if outcome.success {
                self.mark(&campaign.id, CampaignStatus::Sent).await?;
                summary.sent += 1;
            } else {
                self.mark(&campaign.id, CampaignStatus::Failed).await?;
                summary.failed += 1;
            }
        }

        Ok(summary)
    }

    /// Loop principal. Entre pasadas duerme de a un segundo revisando el stop,
    /// hasta `min(poll_interval, 300s)`.
    pub async fn run_automation(&self, poll_interval: Duration) {
        log::info!("(run_automation) Iniciando sistema de outreach...");
        let wait_secs = poll_interval.min(MAX_POLL_INTERVAL).as_secs().max(1);

        'outer: while !self.stop.is_cancelled() {
            match self.process_campaigns().await {
                Ok(summary) => log::info!(
                    "(run_automation) Pasada terminada: encontradas={}, enviadas={}, fallidas={}, corte={:?}",
                    summary.found,
                    summary.sent,
                    summary.failed,
                    summary.aborted
                ),
                Err(e) => log::error!("(run_automation) Error procesando campañas: {}", e),
            }

            for _ in 0..wait_secs {
                tokio::select! {
                    _ = self.stop.cancelled() => {
                        log::info!("(run_automation) Stop detectado, deteniendo...");
                        break 'outer;
                    }
                    _ = sleep(Duration::from_secs(1)) => {}
                }
            }
        }

        self.stop.cancel();
        log::info!("(run_automation) Sistema de outreach detenido");
    }
}

/// Un panic en otro hilo no debería dejar la ventana inutilizable
pub fn lock_window(window: &Mutex<RateWindow>) -> MutexGuard<'_, RateWindow> {
    window.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
