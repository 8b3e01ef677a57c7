//! services/activity_service.rs
//! Log de actividad: una fila por intento de envío, nunca se modifica.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};
use uuid::Uuid;

use crate::models::{
    activity_model::{ActivityRecord, NewActivity},
    from_db_timestamp, to_db_timestamp,
};

#[derive(Clone, Debug)]
pub struct ActivityService {
    db_pool: Pool<Sqlite>,
}

impl ActivityService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        ActivityService { db_pool }
    }

    pub async fn append_activity(&self, activity: NewActivity) -> Result<()> {
        let id = Uuid::new_v4().to_string();
        let now = to_db_timestamp(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO email_activity (
                id, email_from, email_to, subject, context, company_name, response_time, created_at
            )
            VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(&activity.email_from)
        .bind(&activity.email_to)
        .bind(&activity.subject)
        .bind(&activity.company_name)
        .bind(activity.response_time)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al registrar actividad")?;

        log::debug!(
            "(append_activity) Actividad registrada: {} ({})",
            activity.company_name,
            activity.email_to
        );
        Ok(())
    }

    /// Más recientes primero
    pub async fn list_recent(&self, limit: Option<i64>) -> Result<Vec<ActivityRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, email_from, email_to, subject, context, company_name, response_time, created_at
            FROM email_activity
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar actividad")?;

        rows.iter().map(row_to_activity).collect()
    }
}

fn row_to_activity(row: &SqliteRow) -> Result<ActivityRecord> {
    Ok(ActivityRecord {
        id: row.try_get("id")?,
        email_from: row.try_get("email_from")?,
        email_to: row.try_get("email_to")?,
        subject: row.try_get("subject")?,
        context: row.try_get("context")?,
        company_name: row.try_get("company_name")?,
        response_time: row.try_get("response_time")?,
        created_at: from_db_timestamp(&row.try_get::<String, _>("created_at")?)?,
    })
}
