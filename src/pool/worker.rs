//! # Pool de Workers
//! src/pool/worker.rs
//!
//! Un [`WorkerPool`] arranca N threads workers sobre una [`BoundedQueue`]
//! compartida. Cada worker repite: `dequeue` → invocar el handler con
//! ownership del item → seguir. El item (p. ej. un `TcpStream`) se libera
//! al retornar el handler, con éxito o con error, así que la conexión
//! siempre se cierra.
//!
//! La cancelación es cooperativa: el worker la observa en el punto de
//! espera (`dequeue` retorna `None` cuando la cola está cerrada y vacía).
//! Cada pool es dueño de su propio flag de cancelación; nunca se comparte
//! entre generaciones, de modo que un pool reconstruido tras una recarga
//! arranca siempre con flag limpio.

use crate::pool::queue::BoundedQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Handler que procesa un item consumiéndolo
///
/// Un Err se registra y se aísla: nunca tumba al worker ni al pool.
pub type JobHandler<T> = Arc<dyn Fn(T) -> Result<(), String> + Send + Sync>;

/// Pool de N workers sobre una cola acotada
///
/// Se crea y se destruye como unidad (una *generación*).
pub struct WorkerPool<T: Send + 'static> {
    queue: BoundedQueue<T>,
    /// Flag de cancelación propio de esta generación (level-triggered)
    cancel: Arc<AtomicBool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Crea el pool y arranca los N workers
    ///
    /// `label` identifica la generación en los logs (p. ej. "gen1").
    pub fn new(label: &str, queue: BoundedQueue<T>, size: usize, handler: JobHandler<T>) -> Self {
        assert!(size >= 1, "worker pool size must be >= 1");

        let cancel = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::with_capacity(size);

        for i in 0..size {
            let queue = queue.clone();
            let handler = Arc::clone(&handler);
            let name = format!("{}-worker-{}", label, i);

            handles.push(thread::spawn(move || {
                Self::worker_loop(name, queue, handler);
            }));
        }

        Self {
            queue,
            cancel,
            handles: Mutex::new(handles),
            size,
        }
    }

    /// Loop principal del worker
    fn worker_loop(name: String, queue: BoundedQueue<T>, handler: JobHandler<T>) {
        println!("🔧 Worker {} iniciado", name);

        loop {
            // Punto de espera: None = cola cerrada y drenada
            let Some(item) = queue.dequeue() else {
                break;
            };

            // El handler consume el item: se libera al retornar,
            // también en el camino de error
            if let Err(e) = handler(item) {
                eprintln!("❌ Worker {}: {}", name, e);
            }
        }

        println!("🔚 Worker {} finalizado (cola cerrada)", name);
    }

    /// Apaga el pool: cierra la cola y espera a todos los workers
    ///
    /// Los workers drenan lo que quede encolado antes de salir. Idempotente:
    /// una segunda llamada retorna de inmediato sin deadlock ni double-join.
    pub fn shutdown(&self) {
        if self.cancel.swap(true, Ordering::SeqCst) {
            return;
        }

        // Despierta a todos los bloqueados; los workers salen al drenar
        self.queue.close();

        let handles: Vec<_> = self.handles.lock().unwrap().drain(..).collect();
        for handle in handles {
            let _ = handle.join();
        }
    }

    /// Verifica si ya se solicitó el apagado
    pub fn is_shutting_down(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Número de workers del pool
    pub fn size(&self) -> usize {
        self.size
    }
}

impl<T: Send + 'static> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counting_handler(counter: Arc<AtomicUsize>) -> JobHandler<usize> {
        Arc::new(move |_item| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_fan_out_every_item_handled_exactly_once() {
        // N=4 workers, cola de 10, 100 items: el contador debe llegar a 100
        let queue = BoundedQueue::new(10);
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new("test", queue.clone(), 4, counting_handler(counter.clone()));

        for i in 0..100 {
            queue.enqueue(i).unwrap();
        }
        pool.shutdown();

        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn test_handler_error_does_not_stop_the_pool() {
        let queue = BoundedQueue::new(10);
        let counter = Arc::new(AtomicUsize::new(0));

        let handler: JobHandler<usize> = {
            let counter = Arc::clone(&counter);
            Arc::new(move |item| {
                counter.fetch_add(1, Ordering::SeqCst);
                if item % 3 == 0 {
                    Err(format!("simulated failure on item {}", item))
                } else {
                    Ok(())
                }
            })
        };

        let pool = WorkerPool::new("test", queue.clone(), 2, handler);

        for i in 0..30 {
            queue.enqueue(i).unwrap();
        }
        pool.shutdown();

        // Los errores se aíslan: los 30 items pasaron por el handler
        assert_eq!(counter.load(Ordering::SeqCst), 30);
    }

    #[test]
    fn test_shutdown_drains_pending() {
        // Handler lento: al pedir shutdown quedan items encolados,
        // y aun así todos deben procesarse (política de drenado)
        let queue = BoundedQueue::new(20);
        let counter = Arc::new(AtomicUsize::new(0));

        let handler: JobHandler<usize> = {
            let counter = Arc::clone(&counter);
            Arc::new(move |_item| {
                thread::sleep(Duration::from_millis(10));
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        };

        let pool = WorkerPool::new("test", queue.clone(), 2, handler);

        for i in 0..20 {
            queue.enqueue(i).unwrap();
        }
        pool.shutdown();

        assert_eq!(counter.load(Ordering::SeqCst), 20);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let queue: BoundedQueue<usize> = BoundedQueue::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new("test", queue.clone(), 3, counting_handler(counter));

        pool.shutdown();
        // Una segunda llamada no debe colgarse ni hacer panic
        pool.shutdown();
        assert!(pool.is_shutting_down());
    }

    #[test]
    fn test_enqueue_fails_after_shutdown() {
        let queue: BoundedQueue<usize> = BoundedQueue::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new("test", queue.clone(), 1, counting_handler(counter));

        pool.shutdown();
        assert!(queue.enqueue(1).is_err());
    }

    #[test]
    fn test_pool_size() {
        let queue: BoundedQueue<usize> = BoundedQueue::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new("test", queue.clone(), 5, counting_handler(counter));
        assert_eq!(pool.size(), 5);
        pool.shutdown();
    }

    #[test]
    fn test_drop_joins_workers() {
        let queue = BoundedQueue::new(10);
        let counter = Arc::new(AtomicUsize::new(0));

        {
            let pool = WorkerPool::new("test", queue.clone(), 2, counting_handler(counter.clone()));
            for i in 0..10 {
                queue.enqueue(i).unwrap();
            }
            drop(pool);
        }

        // Drop llama shutdown: al salir del scope todo quedó procesado
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }
}
