//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

use chrono::{DateTime, SecondsFormat, Utc};

pub mod activity_model;
pub mod campaign_model;
pub mod scenario_model;
pub mod stats_model;
pub mod template_model;

/// Timestamp en texto de ancho fijo, para que ORDER BY en SQLite sea cronológico.
pub fn to_db_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn from_db_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    use anyhow::Context;
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Timestamp inválido en DB: {}", raw))?;
    Ok(parsed.with_timezone(&Utc))
}
