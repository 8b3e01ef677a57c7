//! services/campaign_service.rs
//! Persistencia de campañas. El CRUD viene del front; las transiciones de
//! estado `pending -> sent/failed` las hace el driver.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};
use uuid::Uuid;

use crate::models::{
    campaign_model::{CampaignRecord, CampaignStatus, NewCampaign, UpdateCampaignRequest},
    from_db_timestamp, to_db_timestamp,
};

const SELECT_CAMPAIGN: &str = r#"
    SELECT id, email, subject, company_name, industry, target_person, context,
           template_id, status, sent_at, created_at, generated_content
    FROM email_campaigns
"#;

#[derive(Clone, Debug)]
pub struct CampaignService {
    db_pool: Pool<Sqlite>,
}

impl CampaignService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        CampaignService { db_pool }
    }

    /// Crea la campaña con estado "pending"
    pub async fn create_campaign(&self, new: NewCampaign) -> Result<CampaignRecord> {
        let id = Uuid::new_v4().to_string();
        let now = to_db_timestamp(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO email_campaigns (
                id, email, subject, company_name, industry, target_person,
                context, template_id, status, sent_at, created_at, generated_content
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'pending', NULL, ?9, ?10)
            "#,
        )
        .bind(&id)
        .bind(&new.email)
        .bind(&new.subject)
        .bind(&new.company_name)
        .bind(&new.industry)
        .bind(&new.target_person)
        .bind(&new.context)
        .bind(&new.template_id)
        .bind(&now)
        .bind(&new.generated_content)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar campaña")?;

        self.get_campaign(&id).await
    }

    /// Inserta varias campañas en una sola transacción (importación)
    pub async fn create_campaigns(&self, batch: Vec<NewCampaign>) -> Result<usize> {
        let mut tx = self.db_pool.begin().await?;
        let count = batch.len();

        for new in batch {
            let id = Uuid::new_v4().to_string();
            let now = to_db_timestamp(Utc::now());
            sqlx::query(
                r#"
                INSERT INTO email_campaigns (
                    id, email, subject, company_name, industry, target_person,
                    context, template_id, status, sent_at, created_at, generated_content
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'pending', NULL, ?9, ?10)
                "#,
            )
            .bind(&id)
            .bind(&new.email)
            .bind(&new.subject)
            .bind(&new.company_name)
            .bind(&new.industry)
            .bind(&new.target_person)
            .bind(&new.context)
            .bind(&new.template_id)
            .bind(&now)
            .bind(&new.generated_content)
            .execute(&mut *tx)
            .await
            .context("Fallo al insertar campaña importada")?;
        }

        tx.commit().await.context("Fallo al confirmar importación")?;
        Ok(count)
    }

    pub async fn get_campaign(&self, id: &str) -> Result<CampaignRecord> {
        let row = sqlx::query(&format!("{SELECT_CAMPAIGN} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Fallo al consultar campaña")?
            .ok_or_else(|| anyhow!("Campaign not found: {}", id))?;

        row_to_campaign(&row)
    }

    /// Todas, más recientes primero. `limit` opcional para el dashboard.
    pub async fn list_campaigns(&self, limit: Option<i64>) -> Result<Vec<CampaignRecord>> {
        let rows = sqlx::query(&format!(
            "{SELECT_CAMPAIGN} ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        ))
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar campañas")?;

        rows.iter().map(row_to_campaign).collect()
    }

    /// Pendientes en orden de creación (el orden en que el driver las procesa)
    pub async fn list_pending(&self) -> Result<Vec<CampaignRecord>> {
        let rows = sqlx::query(&format!(
            "{SELECT_CAMPAIGN} WHERE status = 'pending' ORDER BY created_at ASC, rowid ASC"
        ))
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar campañas pendientes")?;

        rows.iter().map(row_to_campaign).collect()
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: CampaignStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let sent_at = sent_at.map(to_db_timestamp);
        sqlx::query(
            r#"
            UPDATE email_campaigns
            SET status = ?2,
                sent_at = COALESCE(?3, sent_at)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(sent_at)
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar estado de campaña")?;

        Ok(())
    }

    pub async fn update_campaign(
        &self,
        id: &str,
        req: UpdateCampaignRequest,
    ) -> Result<CampaignRecord> {
        let status = req.status.map(|s| s.as_str());
        let result = sqlx::query(
            r#"
            UPDATE email_campaigns
            SET email = COALESCE(?2, email),
                subject = COALESCE(?3, subject),
                company_name = COALESCE(?4, company_name),
                industry = COALESCE(?5, industry),
                target_person = COALESCE(?6, target_person),
                context = COALESCE(?7, context),
                template_id = COALESCE(?8, template_id),
                status = COALESCE(?9, status)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&req.email)
        .bind(&req.subject)
        .bind(&req.company_name)
        .bind(&req.industry)
        .bind(&req.target_person)
        .bind(&req.context)
        .bind(&req.template_id)
        .bind(status)
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar campaña")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("Campaign not found: {}", id));
        }
        self.get_campaign(id).await
    }

    pub async fn delete_campaign(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM email_campaigns WHERE id = ?1")
            .bind(id)
            .execute(&self.db_pool)
            .await
            .context("Fallo al borrar campaña")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("Campaign not found: {}", id));
        }
        Ok(())
    }
}

fn row_to_campaign(row: &SqliteRow) -> Result<CampaignRecord> {
    let status: String = row.try_get("status")?;
    let sent_at: Option<String> = row.try_get("sent_at")?;

    Ok(CampaignRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        subject: row.try_get("subject")?,
        company_name: row.try_get("company_name")?,
        industry: row.try_get("industry")?,
        target_person: row.try_get("target_person")?,
        context: row.try_get("context")?,
        template_id: row.try_get("template_id")?,
        status: status.parse()?,
        sent_at: sent_at.as_deref().map(from_db_timestamp).transpose()?,
        created_at: from_db_timestamp(&row.try_get::<String, _>("created_at")?)?,
        generated_content: row.try_get("generated_content")?,
    })
}
