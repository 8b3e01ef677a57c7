//! services/scenario_service.rs
//! Análisis de escenarios de negocio con IA y su persistencia.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::models::{
    from_db_timestamp,
    scenario_model::{ScenarioAnalysisResponse, ScenarioTraining},
    to_db_timestamp,
};
use crate::services::{
    ai_service::TextGenerator,
    prompts::{learning_prompt, response_strategy_prompt, scenario_analysis_prompt},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    ExpiringContract,
    NewSolicitation,
    PartnershipOpportunity,
    CapabilityStatement,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::ExpiringContract,
        ScenarioKind::NewSolicitation,
        ScenarioKind::PartnershipOpportunity,
        ScenarioKind::CapabilityStatement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::ExpiringContract => "expiring_contract",
            ScenarioKind::NewSolicitation => "new_solicitation",
            ScenarioKind::PartnershipOpportunity => "partnership_opportunity",
            ScenarioKind::CapabilityStatement => "capability_statement",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL.into_iter().find(|k| k.as_str() == normalized)
    }

    fn default_indicators(&self) -> &'static [&'static str] {
        match self {
            ScenarioKind::ExpiringContract => &[
                "contract expiring",
                "current vendor",
                "incumbent",
                "recompete",
                "renewal",
            ],
            ScenarioKind::NewSolicitation => &[
                "new contract",
                "rfp",
                "rfq",
                "sources sought",
                "new requirement",
            ],
            ScenarioKind::PartnershipOpportunity => &[
                "teaming",
                "partnership",
                "joint venture",
                "collaboration",
                "subcontracting",
            ],
            ScenarioKind::CapabilityStatement => &[
                "capabilities",
                "qualification",
                "experience",
                "past performance",
            ],
        }
    }

    pub fn required_info(&self) -> &'static [&'static str] {
        match self {
            ScenarioKind::ExpiringContract => &[
                "expiration_date",
                "contract_value",
                "incumbent_name",
                "performance_location",
            ],
            ScenarioKind::NewSolicitation => &[
                "solicitation_number",
                "response_deadline",
                "naics_code",
                "contract_value",
            ],
            ScenarioKind::PartnershipOpportunity => &[
                "partner_capabilities",
                "target_contracts",
                "complementary_skills",
            ],
            ScenarioKind::CapabilityStatement => &[
                "relevant_experience",
                "certifications",
                "differentiators",
            ],
        }
    }
}

/// Frases indicadoras por tipo; crecen con el feedback
#[derive(Debug)]
pub struct IndicatorCatalog {
    indicators: HashMap<ScenarioKind, Vec<String>>,
}

impl Default for IndicatorCatalog {
    fn default() -> Self {
        let indicators = ScenarioKind::ALL
            .into_iter()
            .map(|k| {
                let phrases = k.default_indicators().iter().map(|s| s.to_string()).collect();
                (k, phrases)
            })
            .collect();
        Self { indicators }
    }
}

impl IndicatorCatalog {
    /// Tipo con más coincidencias; sin coincidencias => capability_statement
    pub fn classify(&self, text: &str) -> ScenarioKind {
        let haystack = text.to_lowercase();
        let mut best = (ScenarioKind::CapabilityStatement, 0usize);
        for kind in ScenarioKind::ALL {
            let hits = self.indicators[&kind]
                .iter()
                .filter(|p| haystack.contains(p.as_str()))
                .count();
            if hits > best.1 {
                best = (kind, hits);
            }
        }
        best.0
    }

    pub fn extend(&mut self, kind: ScenarioKind, patterns: impl IntoIterator<Item = String>) {
        let entry = self.indicators.entry(kind).or_default();
        for p in patterns {
            let p = p.trim().to_lowercase();
            if !p.is_empty() && !entry.contains(&p) {
                entry.push(p);
            }
        }
    }

    pub fn indicators(&self, kind: ScenarioKind) -> &[String] {
        self.indicators.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }
}

/// La IA a veces envuelve el JSON en ```json ... ```
pub fn parse_json_reply(reply: &str) -> Result<Value> {
    let trimmed = reply.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```"))
        .unwrap_or(trimmed)
        .trim();

    let value: Value = serde_json::from_str(body).context("La respuesta de la IA no es JSON válido")?;
    if !value.is_object() {
        return Err(anyhow!("La respuesta de la IA no es un objeto JSON"));
    }
    Ok(value)
}

#[derive(Clone)]
pub struct ScenarioService {
    db_pool: Pool<Sqlite>,
    generator: Arc<dyn TextGenerator>,
    catalog: Arc<RwLock<IndicatorCatalog>>,
}

impl ScenarioService {
    pub fn new(db_pool: Pool<Sqlite>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            db_pool,
            generator,
            catalog: Arc::new(RwLock::new(IndicatorCatalog::default())),
        }
    }

    /// Pide el análisis y normaliza `scenario_type`
    pub async fn analyze_scenario(
        &self,
        input_text: &str,
        additional_context: Option<&str>,
    ) -> Result<Value> {
        let prompt = scenario_analysis_prompt(input_text, additional_context);
        let reply = self
            .generator
            .generate(&prompt)
            .await
            .context("Error analizando escenario")?;
        let mut analysis = parse_json_reply(&reply)?;

        let declared = analysis
            .get("scenario_type")
            .and_then(Value::as_str)
            .and_then(ScenarioKind::parse);
        let kind = match declared {
            Some(kind) => kind,
            None => {
                let text = format!("{} {}", input_text, additional_context.unwrap_or_default());
                let kind = self
                    .catalog
                    .read()
                    .map_err(|_| anyhow!("Catálogo de indicadores envenenado"))?
                    .classify(&text);
                log::info!(
                    "(analyze_scenario) La IA no devolvió un tipo válido, se usa {}",
                    kind.as_str()
                );
                kind
            }
        };
        analysis["scenario_type"] = Value::String(kind.as_str().to_string());
        if analysis.get("required_info").is_none() {
            analysis["required_info"] = Value::from(kind.required_info().to_vec());
        }
        Ok(analysis)
    }

    pub async fn generate_response_strategy(&self, analysis: &Value) -> Result<Value> {
        let reply = self
            .generator
            .generate(&response_strategy_prompt(analysis))
            .await
            .context("Error generando estrategia de respuesta")?;
        parse_json_reply(&reply)
    }

    /// Análisis + estrategia sin persistir
    pub async fn analyze_with_strategy(
        &self,
        input_text: &str,
        additional_context: Option<&str>,
    ) -> Result<ScenarioAnalysisResponse> {
        let analysis = self.analyze_scenario(input_text, additional_context).await?;
        let strategy = self.generate_response_strategy(&analysis).await?;
        Ok(ScenarioAnalysisResponse {
            success: true,
            analysis,
            strategy,
        })
    }

    /// Análisis + estrategia y guarda la fila de entrenamiento
    pub async fn train(
        &self,
        input_text: &str,
        additional_context: Option<&str>,
    ) -> Result<ScenarioTraining> {
        let result = self.analyze_with_strategy(input_text, additional_context).await?;
        let scenario_type = result
            .analysis
            .get("scenario_type")
            .and_then(Value::as_str)
            .unwrap_or(ScenarioKind::CapabilityStatement.as_str())
            .to_string();

        let id = Uuid::new_v4().to_string();
        let now = to_db_timestamp(Utc::now());
        sqlx::query(
            r#"
            INSERT INTO scenario_training (
                id, scenario_type, input_text, analysis, response_strategy,
                success_metrics, learning_insights, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, '{}', '{}', ?6)
            "#,
        )
        .bind(&id)
        .bind(&scenario_type)
        .bind(input_text)
        .bind(result.analysis.to_string())
        .bind(result.strategy.to_string())
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al guardar escenario")?;

        log::info!("(train) Escenario {} guardado como {}", id, scenario_type);
        self.get_scenario(&id).await
    }

    /// Aprende del resultado: guarda métricas e insights y amplía los indicadores
    pub async fn learn_from_feedback(
        &self,
        scenario_id: &str,
        success_metrics: Value,
    ) -> Result<ScenarioTraining> {
        let scenario = self.get_scenario(scenario_id).await?;
        let reply = self
            .generator
            .generate(&learning_prompt(
                &scenario.scenario_type,
                &scenario.input_text,
                &success_metrics,
            ))
            .await
            .context("Error aprendiendo del feedback")?;
        let insights = parse_json_reply(&reply)?;

        if let Some(kind) = ScenarioKind::parse(&scenario.scenario_type) {
            let patterns: Vec<String> = insights
                .get("new_patterns")
                .and_then(Value::as_array)
                .map(|arr| arr.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default();
            if !patterns.is_empty() {
                log::info!(
                    "(learn_from_feedback) {} patrones nuevos para {}",
                    patterns.len(),
                    kind.as_str()
                );
                self.catalog
                    .write()
                    .map_err(|_| anyhow!("Catálogo de indicadores envenenado"))?
                    .extend(kind, patterns);
            }
        }

        sqlx::query(
            r#"
            UPDATE scenario_training
            SET success_metrics = ?2,
                learning_insights = ?3
            WHERE id = ?1
            "#,
        )
        .bind(scenario_id)
        .bind(success_metrics.to_string())
        .bind(insights.to_string())
        .execute(&self.db_pool)
        .await
        .context("Fallo al guardar feedback del escenario")?;

        self.get_scenario(scenario_id).await
    }

    pub fn indicators(&self, kind: ScenarioKind) -> Vec<String> {
        self.catalog
            .read()
            .map(|c| c.indicators(kind).to_vec())
            .unwrap_or_default()
    }

    pub async fn get_scenario(&self, id: &str) -> Result<ScenarioTraining> {
        let row = sqlx::query(
            r#"
            SELECT id, scenario_type, input_text, analysis, response_strategy,
                   success_metrics, learning_insights, created_at
            FROM scenario_training
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al consultar escenario")?
        .ok_or_else(|| anyhow!("Scenario not found: {}", id))?;

        row_to_scenario(&row)
    }

    pub async fn list_scenarios(&self) -> Result<Vec<ScenarioTraining>> {
        let rows = sqlx::query(
            r#"
            SELECT id, scenario_type, input_text, analysis, response_strategy,
                   success_metrics, learning_insights, created_at
            FROM scenario_training
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar escenarios")?;

        rows.iter().map(row_to_scenario).collect()
    }
}

fn json_column(row: &SqliteRow, column: &str) -> Result<Option<Value>> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| serde_json::from_str(&s).with_context(|| format!("JSON inválido en {}", column)))
        .transpose()
}

fn row_to_scenario(row: &SqliteRow) -> Result<ScenarioTraining> {
    Ok(ScenarioTraining {
        id: row.try_get("id")?,
        scenario_type: row.try_get("scenario_type")?,
        input_text: row.try_get("input_text")?,
        analysis: json_column(row, "analysis")?,
        response_strategy: json_column(row, "response_strategy")?,
        success_metrics: json_column(row, "success_metrics")?,
        learning_insights: json_column(row, "learning_insights")?,
        created_at: from_db_timestamp(&row.try_get::<String, _>("created_at")?)?,
    })
}
