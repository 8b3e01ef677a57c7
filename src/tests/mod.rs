//! tests/mod.rs
//! Pruebas unitarias e integración liviana (SQLite en memoria, fakes, wiremock).

mod automation_tests;
mod handler_tests;
mod rate_limiter_tests;
mod scenario_tests;
mod support;
