//! # Pool Server
//! src/lib.rs
//!
//! Servidor TCP concurrente implementado desde cero para demostrar
//! conceptos de sistemas operativos: cola acotada con backpressure,
//! pool de workers, recarga en caliente y apagado ordenado.
//!
//! ## Arquitectura
//!
//! ```text
//! Acceptor → BoundedQueue → WorkerPool → handler
//!               ↑  generación (se reemplaza entera en cada recarga)
//! ```
//!
//! El servidor está dividido en módulos especializados:
//! - `config`: opciones CLI y snapshot inmutable del archivo KEY=VALUE
//! - `signals`: triggers de recarga/terminación conectados a SIGHUP/SIGTERM
//! - `pool`: cola acotada thread-safe y pool de N workers
//! - `handler`: el colaborador que responde cada conexión
//! - `server`: accept loop, generaciones y transiciones de recarga/apagado
//! - `metrics`: contadores y snapshot JSON
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use pool_server::config::{CliArgs, ConfigSnapshot};
//! use pool_server::server::Server;
//! use pool_server::signals::Triggers;
//!
//! let args = CliArgs::default();
//! let snapshot = ConfigSnapshot::load_validated(&args.config_path).unwrap();
//! let triggers = Triggers::install().unwrap();
//!
//! let mut server = Server::new(args, snapshot, triggers);
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod config;
pub mod handler;
pub mod metrics;
pub mod pool;
pub mod server;
pub mod signals;
