//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta contadores del servidor: conexiones aceptadas/atendidas,
//! errores del handler, rechazos por cola cerrada y recargas. Todo bajo un
//! mutex propio, separado del mutex de la cola.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
struct MetricsData {
    /// Conexiones aceptadas por el acceptor
    accepted: u64,

    /// Conexiones atendidas por algún worker
    handled: u64,

    /// Fallos del handler (aislados por conexión)
    handler_errors: u64,

    /// Encolados rechazados (cola cerrada durante apagado/recarga)
    rejected: u64,

    /// Recargas aplicadas y recargas abortadas
    reloads: u64,
    failed_reloads: u64,

    /// Generación activa y su tamaño
    generation: u64,
    pool_size: usize,
    queue_capacity: usize,

    /// Conexiones atendidas por generación
    handled_per_generation: HashMap<u64, u64>,
}

impl MetricsCollector {
    /// Crea un nuevo collector de métricas
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData {
                accepted: 0,
                handled: 0,
                handler_errors: 0,
                rejected: 0,
                reloads: 0,
                failed_reloads: 0,
                generation: 0,
                pool_size: 0,
                queue_capacity: 0,
                handled_per_generation: HashMap::new(),
            })),
            start_time: Instant::now(),
        }
    }

    /// Registra una conexión aceptada
    pub fn record_accepted(&self) {
        self.inner.lock().unwrap().accepted += 1;
    }

    /// Registra una conexión atendida por la generación dada
    pub fn record_handled(&self, generation: u64) {
        let mut data = self.inner.lock().unwrap();
        data.handled += 1;
        *data.handled_per_generation.entry(generation).or_insert(0) += 1;
    }

    /// Registra un fallo del handler
    pub fn record_handler_error(&self) {
        self.inner.lock().unwrap().handler_errors += 1;
    }

    /// Registra un encolado rechazado
    pub fn record_rejected(&self) {
        self.inner.lock().unwrap().rejected += 1;
    }

    /// Registra el arranque de una generación
    pub fn record_generation(&self, generation: u64, pool_size: usize, queue_capacity: usize) {
        let mut data = self.inner.lock().unwrap();
        data.generation = generation;
        data.pool_size = pool_size;
        data.queue_capacity = queue_capacity;
    }

    /// Registra una recarga aplicada
    pub fn record_reload(&self) {
        self.inner.lock().unwrap().reloads += 1;
    }

    /// Registra una recarga abortada
    pub fn record_failed_reload(&self) {
        self.inner.lock().unwrap().failed_reloads += 1;
    }

    /// Obtiene las métricas actuales en formato JSON
    pub fn get_metrics_json(&self) -> serde_json::Value {
        let data = self.inner.lock().unwrap();

        let per_generation: HashMap<String, u64> = data
            .handled_per_generation
            .iter()
            .map(|(generation, count)| (format!("gen{}", generation), *count))
            .collect();

        serde_json::json!({
            "server": {
                "uptime_seconds": self.start_time.elapsed().as_secs(),
                "generation": data.generation,
                "pool_size": data.pool_size,
                "queue_capacity": data.queue_capacity,
            },
            "connections": {
                "accepted": data.accepted,
                "handled": data.handled,
                "handler_errors": data.handler_errors,
                "rejected": data.rejected,
                "per_generation": per_generation,
            },
            "reloads": {
                "applied": data.reloads,
                "failed": data.failed_reloads,
            },
        })
    }

    /// Obtiene un snapshot de las métricas (para uso externo y tests)
    pub fn get_snapshot(&self) -> MetricsSnapshot {
        let data = self.inner.lock().unwrap();
        MetricsSnapshot {
            accepted: data.accepted,
            handled: data.handled,
            handler_errors: data.handler_errors,
            rejected: data.rejected,
            reloads: data.reloads,
            failed_reloads: data.failed_reloads,
            generation: data.generation,
            pool_size: data.pool_size,
            queue_capacity: data.queue_capacity,
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Conexiones atendidas por una generación específica
    pub fn handled_by_generation(&self, generation: u64) -> u64 {
        let data = self.inner.lock().unwrap();
        data.handled_per_generation
            .get(&generation)
            .copied()
            .unwrap_or(0)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot de métricas (para uso externo)
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub accepted: u64,
    pub handled: u64,
    pub handler_errors: u64,
    pub rejected: u64,
    pub reloads: u64,
    pub failed_reloads: u64,
    pub generation: u64,
    pub pool_size: usize,
    pub queue_capacity: usize,
    pub uptime_secs: u64,
}
