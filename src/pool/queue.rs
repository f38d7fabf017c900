//! # Cola Acotada de Conexiones
//! src/pool/queue.rs
//!
//! Implementa una cola FIFO thread-safe de capacidad fija con semántica
//! de bloqueo en ambos extremos:
//!
//! - `enqueue` bloquea al productor mientras la cola está llena (backpressure)
//! - `dequeue` bloquea al consumidor mientras la cola está vacía
//!
//! Un único mutex protege el buffer y el flag de cierre; dos condvars
//! (`not_empty`, `not_full`) despiertan a consumidores y productores.
//! `close()` hace broadcast en ambas para que ningún thread quede esperando
//! para siempre durante el apagado.
//!
//! Política de drenado: después de `close()` los items ya encolados siguen
//! saliendo por `dequeue`; solo cuando la cola está cerrada *y* vacía el
//! consumidor recibe `None`. Un `enqueue` sobre una cola cerrada falla en
//! lugar de bloquear.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

/// Estado interno protegido por el mutex
struct QueueState<T> {
    buffer: VecDeque<T>,
    closed: bool,
}

/// Cola FIFO acotada y thread-safe
///
/// Clonar la cola comparte el mismo buffer (los clones son handles).
pub struct BoundedQueue<T> {
    state: Arc<Mutex<QueueState<T>>>,
    not_empty: Arc<Condvar>,
    not_full: Arc<Condvar>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Crea una cola con capacidad fija (>= 1)
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "queue capacity must be >= 1");
        Self {
            state: Arc::new(Mutex::new(QueueState {
                buffer: VecDeque::with_capacity(capacity),
                closed: false,
            })),
            not_empty: Arc::new(Condvar::new()),
            not_full: Arc::new(Condvar::new()),
            capacity,
        }
    }

    /// Encola un item al final de la cola
    ///
    /// Bloquea mientras la cola está llena. Retorna Err si la cola ya fue
    /// cerrada (incluido el caso de despertar de la espera por cierre);
    /// el item se descarta en ese caso.
    pub fn enqueue(&self, item: T) -> Result<(), String> {
        let mut state = self.state.lock().unwrap();

        loop {
            if state.closed {
                return Err("queue is closed, not accepting new items".to_string());
            }
            if state.buffer.len() < self.capacity {
                break;
            }
            // Cola llena: esperar a que un consumidor haga espacio
            state = self.not_full.wait(state).unwrap();
        }

        state.buffer.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Desencola el item del frente de la cola
    ///
    /// Bloquea mientras la cola está vacía y abierta. Con la cola cerrada
    /// sigue entregando lo pendiente (drenado) y retorna `None` solo cuando
    /// está cerrada y vacía.
    pub fn dequeue(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap();

        loop {
            if let Some(item) = state.buffer.pop_front() {
                self.not_full.notify_one();
                return Some(item);
            }
            if state.closed {
                return None;
            }
            state = self.not_empty.wait(state).unwrap();
        }
    }

    /// Cierra la cola y despierta a todos los bloqueados
    ///
    /// Idempotente. Broadcast (no señal simple) en ambas condvars: todo
    /// productor bloqueado debe fallar y todo consumidor bloqueado debe
    /// poder drenar o salir.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Verifica si la cola está cerrada
    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    /// Retorna el tamaño actual de la cola
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().buffer.len()
    }

    /// Verifica si la cola está vacía
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retorna la capacidad fija
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            not_empty: Arc::clone(&self.not_empty),
            not_full: Arc::clone(&self.not_full),
            capacity: self.capacity,
        }
    }
}
