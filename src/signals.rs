//! # Señales y Triggers de Control
//! src/signals.rs
//!
//! Traduce señales del proceso a flags level-triggered que el accept loop
//! sondea una vez por iteración:
//!
//! - `SIGHUP`  → recargar configuración (reconstruir la generación)
//! - `SIGTERM` / `SIGINT` → apagado ordenado
//!
//! El handler de señal solo hace un store atómico, que es async-signal-safe.
//! El resto del programa nunca toca estado global: recibe un [`Triggers`]
//! explícito. Los tests construyen `Triggers::new()` sin registrar señales
//! y disparan los flags a mano, en total aislamiento.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Flags registrados para los handlers de señal del proceso
///
/// Los handlers C no pueden capturar estado, así que `install()` publica
/// aquí los Arcs del Triggers que queda conectado a las señales.
static HOOKED: OnceLock<(Arc<AtomicBool>, Arc<AtomicBool>)> = OnceLock::new();

extern "C" fn handle_signal(signal: libc::c_int) {
    // Solo stores atómicos: async-signal-safe
    if let Some((reload, terminate)) = HOOKED.get() {
        match signal {
            libc::SIGHUP => reload.store(true, Ordering::Relaxed),
            libc::SIGTERM | libc::SIGINT => terminate.store(true, Ordering::Relaxed),
            _ => {}
        }
    }
}

/// Par de triggers de control: recarga y terminación
///
/// Ambos son level-triggered: es seguro consultarlos repetidamente y es
/// seguro que la señal llegue antes de que el loop empiece a sondear.
#[derive(Clone)]
pub struct Triggers {
    reload: Arc<AtomicBool>,
    terminate: Arc<AtomicBool>,
}

impl Triggers {
    /// Crea triggers aislados, sin conectar a señales del SO
    pub fn new() -> Self {
        Self {
            reload: Arc::new(AtomicBool::new(false)),
            terminate: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Crea triggers y registra los handlers de SIGHUP/SIGTERM/SIGINT
    ///
    /// Retorna Err si ya se instalaron triggers en este proceso (los
    /// handlers de señal son globales al proceso, solo puede haber un par).
    pub fn install() -> Result<Self, String> {
        let triggers = Triggers::new();

        HOOKED
            .set((Arc::clone(&triggers.reload), Arc::clone(&triggers.terminate)))
            .map_err(|_| "signal triggers already installed for this process".to_string())?;

        let handler = handle_signal as *const () as libc::sighandler_t;
        unsafe {
            libc::signal(libc::SIGHUP, handler);
            libc::signal(libc::SIGTERM, handler);
            libc::signal(libc::SIGINT, handler);
        }

        Ok(triggers)
    }

    /// Solicita una recarga de configuración (equivale a SIGHUP)
    pub fn request_reload(&self) {
        self.reload.store(true, Ordering::SeqCst);
    }

    /// Solicita la terminación del servidor (equivale a SIGTERM)
    pub fn request_terminate(&self) {
        self.terminate.store(true, Ordering::SeqCst);
    }

    /// Consume el flag de recarga: true si había una recarga pendiente
    ///
    /// El flag vuelve a false para que cada SIGHUP cause una sola recarga.
    pub fn take_reload(&self) -> bool {
        self.reload.swap(false, Ordering::SeqCst)
    }

    /// Consulta el flag de terminación (no se consume: es terminal)
    pub fn terminate_requested(&self) -> bool {
        self.terminate.load(Ordering::SeqCst)
    }
}

impl Default for Triggers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggers_start_clear() {
        let triggers = Triggers::new();
        assert!(!triggers.take_reload());
        assert!(!triggers.terminate_requested());
    }

    #[test]
    fn test_reload_is_consumed_once() {
        let triggers = Triggers::new();
        triggers.request_reload();
        assert!(triggers.take_reload());
        // Consumido: la siguiente consulta ya no ve recarga pendiente
        assert!(!triggers.take_reload());
    }

    #[test]
    fn test_terminate_is_level_triggered() {
        let triggers = Triggers::new();
        triggers.request_terminate();
        // No se consume: sigue activo en consultas repetidas
        assert!(triggers.terminate_requested());
        assert!(triggers.terminate_requested());
    }

    #[test]
    fn test_trigger_before_polling_is_not_lost() {
        // La señal puede llegar antes de que el loop empiece a sondear
        let triggers = Triggers::new();
        triggers.request_reload();
        triggers.request_terminate();

        let clone = triggers.clone();
        assert!(clone.take_reload());
        assert!(clone.terminate_requested());
    }

    #[test]
    fn test_clones_share_flags() {
        let triggers = Triggers::new();
        let clone = triggers.clone();
        clone.request_terminate();
        assert!(triggers.terminate_requested());
    }
}
