//! services/stats_service.rs
//! Fila única (id = 1) con los contadores agregados.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};

use crate::models::{
    from_db_timestamp,
    stats_model::{AutomationStatus, SystemStats},
    to_db_timestamp,
};

const STATS_ROW_ID: i64 = 1;

#[derive(Clone, Debug)]
pub struct StatsService {
    db_pool: Pool<Sqlite>,
}

impl StatsService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        StatsService { db_pool }
    }

    /// Crea la fila si no existe y la devuelve
    pub async fn get_or_create(&self) -> Result<SystemStats> {
        sqlx::query("INSERT OR IGNORE INTO system_stats (id, status) VALUES (?1, 'stopped')")
            .bind(STATS_ROW_ID)
            .execute(&self.db_pool)
            .await
            .context("Fallo al crear fila de stats")?;

        let row = sqlx::query(
            r#"
            SELECT total_emails_processed, total_responses_sent, avg_response_time, status, last_check
            FROM system_stats
            WHERE id = ?1
            "#,
        )
        .bind(STATS_ROW_ID)
        .fetch_one(&self.db_pool)
        .await
        .context("Fallo al leer stats")?;

        let status: String = row.try_get("status")?;
        let last_check: Option<String> = row.try_get("last_check")?;
        Ok(SystemStats {
            total_emails_processed: row.try_get("total_emails_processed")?,
            total_responses_sent: row.try_get("total_responses_sent")?,
            avg_response_time: row.try_get("avg_response_time")?,
            status: AutomationStatus::parse(&status),
            last_check: last_check.as_deref().map(from_db_timestamp).transpose()?,
        })
    }

    /// Guarda contadores y last_check. El status solo lo cambia `set_status`,
    /// así el driver no pisa un stop concurrente.
    pub async fn save(&self, stats: &SystemStats) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO system_stats (
                id, total_emails_processed, total_responses_sent, avg_response_time, status, last_check
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                total_emails_processed = excluded.total_emails_processed,
                total_responses_sent = excluded.total_responses_sent,
                avg_response_time = excluded.avg_response_time,
                last_check = excluded.last_check
            "#,
        )
        .bind(STATS_ROW_ID)
        .bind(stats.total_emails_processed)
        .bind(stats.total_responses_sent)
        .bind(stats.avg_response_time)
        .bind(stats.status.as_str())
        .bind(stats.last_check.map(to_db_timestamp))
        .execute(&self.db_pool)
        .await
        .context("Fallo al guardar stats")?;

        Ok(())
    }

    /// Transición start/stop
    pub async fn set_status(&self, status: AutomationStatus) -> Result<SystemStats> {
        self.get_or_create().await?;
        let now = to_db_timestamp(Utc::now());
        sqlx::query("UPDATE system_stats SET status = ?2, last_check = ?3 WHERE id = ?1")
            .bind(STATS_ROW_ID)
            .bind(status.as_str())
            .bind(&now)
            .execute(&self.db_pool)
            .await
            .context("Fallo al actualizar status de stats")?;

        self.get_or_create().await
    }
}
