//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto y acepta conexiones entrantes
//! 2. Encola cada conexión en la generación activa (cola + pool)
//! 3. Reemplaza la generación completa al recibir el trigger de recarga
//! 4. Drena y apaga ordenadamente al recibir el trigger de terminación

pub mod generation;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use generation::Generation;
pub use tcp::Server;
