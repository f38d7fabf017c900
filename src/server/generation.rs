//! # Generaciones de Pool + Cola
//! src/server/generation.rs
//!
//! Una *generación* es un par cola acotada + pool de workers creado y
//! destruido como unidad. El arranque crea la generación 1; cada recarga
//! construye la generación siguiente con el snapshot nuevo y recién
//! entonces apaga la anterior. Cada generación es dueña de su propio flag
//! de cancelación (dentro de su `WorkerPool`); nada se comparte entre
//! generaciones.

use crate::config::ConfigSnapshot;
use crate::handler::ConnHandler;
use crate::metrics::MetricsCollector;
use crate::pool::{BoundedQueue, JobHandler, WorkerPool};
use std::net::TcpStream;
use std::sync::Arc;

/// Una generación activa: cola + pool dimensionados por un snapshot
pub struct Generation {
    id: u64,
    queue: BoundedQueue<TcpStream>,
    pool: WorkerPool<TcpStream>,
}

impl Generation {
    /// Construye la cola y arranca el pool según el snapshot
    pub fn start(
        id: u64,
        snapshot: &ConfigSnapshot,
        handler: ConnHandler,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        let queue = BoundedQueue::new(snapshot.queue_size);

        // Envolver el handler para contabilizar por generación
        let counted: JobHandler<TcpStream> = Arc::new(move |stream: TcpStream| {
            let result = handler(stream);
            metrics.record_handled(id);
            if result.is_err() {
                metrics.record_handler_error();
            }
            result
        });

        let label = format!("gen{}", id);
        let pool = WorkerPool::new(&label, queue.clone(), snapshot.pool_size, counted);

        println!(
            "[+] Generación {} activa: {} workers, cola de {}",
            id, snapshot.pool_size, snapshot.queue_size
        );

        Self { id, queue, pool }
    }

    /// Encola una conexión aceptada
    ///
    /// Bloquea con la cola llena (backpressure hacia el acceptor).
    /// Falla si la generación ya está en apagado.
    pub fn submit(&self, conn: TcpStream) -> Result<(), String> {
        self.queue.enqueue(conn)
    }

    /// Apaga la generación: drena la cola y espera a sus workers
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }

    /// Identificador de la generación
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Número de workers de esta generación
    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    /// Profundidad actual de la cola
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}
