//! # Módulo de Métricas
//! src/metrics/mod.rs
//!
//! Observabilidad básica del servidor: contadores agregados y snapshot
//! en JSON, impreso al apagar y disponible para los tests.

pub mod collector;

// Re-exportar para facilitar el uso
pub use collector::{MetricsCollector, MetricsSnapshot};
