//! # Cola Acotada y Pool de Workers
//! src/pool/mod.rs
//!
//! Núcleo de concurrencia del servidor:
//!
//! ```text
//! Acceptor → BoundedQueue → WorkerPool → handler
//! ```
//!
//! La cola da backpressure (el productor bloquea con cola llena) y el pool
//! consume con N threads en paralelo. Ambos se crean y destruyen juntos
//! como una generación (ver `server::generation`).

pub mod queue;
pub mod worker;

// Re-exportar para facilitar el uso
pub use queue::BoundedQueue;
pub use worker::{JobHandler, WorkerPool};
