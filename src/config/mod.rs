//! config/mod.rs
//! Configuración de la aplicación, leída del entorno (.env) y de la línea de comandos.

pub mod app_config;
pub mod cli;
