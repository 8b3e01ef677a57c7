//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod activity_service;
pub mod ai_service;
pub mod automation_service;
pub mod campaign_service;
pub mod draft_service;
pub mod email_service;
pub mod outreach_service;
pub mod outreach_store;
pub mod prompts;
pub mod rate_limiter;
pub mod scenario_service;
pub mod stats_service;
pub mod template_service;
