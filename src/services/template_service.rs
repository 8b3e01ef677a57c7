//! services/template_service.rs
//! CRUD de plantillas de email. El driver las usa como catálogo en el prompt.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};
use uuid::Uuid;

use crate::models::{
    from_db_timestamp,
    template_model::{EmailTemplate, TemplateRequest, DEFAULT_VARIABLES_GUIDE},
    to_db_timestamp,
};

const SELECT_TEMPLATE: &str = r#"
    SELECT id, name, description, template_content, variables_guide, created_at, updated_at
    FROM email_templates
"#;

#[derive(Clone, Debug)]
pub struct TemplateService {
    db_pool: Pool<Sqlite>,
}

impl TemplateService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        TemplateService { db_pool }
    }

    pub async fn create_template(&self, req: TemplateRequest) -> Result<EmailTemplate> {
        let id = Uuid::new_v4().to_string();
        let now = to_db_timestamp(Utc::now());
        let guide = req
            .variables_guide
            .unwrap_or_else(|| DEFAULT_VARIABLES_GUIDE.to_string());

        sqlx::query(
            r#"
            INSERT INTO email_templates (
                id, name, description, template_content, variables_guide, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.template_content)
        .bind(&guide)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar plantilla")?;

        self.get_template(&id).await
    }

    pub async fn update_template(&self, id: &str, req: TemplateRequest) -> Result<EmailTemplate> {
        let now = to_db_timestamp(Utc::now());
        let result = sqlx::query(
            r#"
            UPDATE email_templates
            SET name = ?2,
                description = ?3,
                template_content = ?4,
                variables_guide = COALESCE(?5, variables_guide),
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.template_content)
        .bind(&req.variables_guide)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar plantilla")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("Template not found: {}", id);
        }
        self.get_template(id).await
    }

    pub async fn delete_template(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM email_templates WHERE id = ?1")
            .bind(id)
            .execute(&self.db_pool)
            .await
            .context("Fallo al borrar plantilla")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("Template not found: {}", id);
        }
        Ok(())
    }

    pub async fn get_template(&self, id: &str) -> Result<EmailTemplate> {
        let row = sqlx::query(&format!("{SELECT_TEMPLATE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Fallo al consultar plantilla")?
            .ok_or_else(|| anyhow::anyhow!("Template not found: {}", id))?;

        row_to_template(&row)
    }

    /// Más recientes primero
    pub async fn list_templates(&self) -> Result<Vec<EmailTemplate>> {
        let rows = sqlx::query(&format!("{SELECT_TEMPLATE} ORDER BY created_at DESC, rowid DESC"))
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar plantillas")?;

        rows.iter().map(row_to_template).collect()
    }
}

fn row_to_template(row: &SqliteRow) -> Result<EmailTemplate> {
    Ok(EmailTemplate {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        template_content: row.try_get("template_content")?,
        variables_guide: row.try_get("variables_guide")?,
        created_at: from_db_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: from_db_timestamp(&row.try_get::<String, _>("updated_at")?)?,
    })
}
