//! # Servidor TCP con Pool de Workers
//! src/server/tcp.rs
//!
//! El servidor es el acceptor del sistema: acepta conexiones y las encola
//! en la generación activa. Entre accepts sondea los triggers:
//!
//! - terminación → deja de aceptar, drena la generación final y retorna
//! - recarga → lee un snapshot nuevo y reemplaza la generación completa
//!
//! El listener trabaja en modo no bloqueante y el loop duerme un intervalo
//! corto cuando no hay conexiones, de modo que los flags se observan con
//! latencia acotada aunque no llegue tráfico.
//!
//! El swap de generación ocurre en el propio thread del accept loop, así
//! que ningún `submit` puede ver una generación a medio reemplazar: nunca
//! hay cero ni dos generaciones recibiendo trabajo.

use crate::config::{CliArgs, ConfigSnapshot};
use crate::handler::{hello_handler, ConnHandler};
use crate::metrics::MetricsCollector;
use crate::server::generation::Generation;
use crate::signals::Triggers;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Intervalo de sondeo del accept loop cuando no hay conexiones
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Servidor TCP concurrente con cola acotada y pool de workers
pub struct Server {
    config_path: String,
    host: String,
    snapshot: ConfigSnapshot,
    triggers: Triggers,
    handler: ConnHandler,
    metrics: Arc<MetricsCollector>,
    listener: Option<TcpListener>,
}

impl Server {
    /// Crea el servidor con el handler por defecto
    pub fn new(args: CliArgs, snapshot: ConfigSnapshot, triggers: Triggers) -> Self {
        Self::with_handler(args, snapshot, triggers, hello_handler)
    }

    /// Crea el servidor con un handler propio (punto de extensión)
    pub fn with_handler(
        args: CliArgs,
        snapshot: ConfigSnapshot,
        triggers: Triggers,
        handler: ConnHandler,
    ) -> Self {
        Self {
            config_path: args.config_path,
            host: args.host,
            snapshot,
            triggers,
            handler,
            metrics: Arc::new(MetricsCollector::new()),
            listener: None,
        }
    }

    /// Acceso a las métricas del servidor
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.metrics)
    }

    /// Hace bind del listener en host:puerto del snapshot
    ///
    /// Un fallo aquí es fatal de arranque: el caller debe abortar.
    pub fn bind(&mut self) -> io::Result<()> {
        let address = format!("{}:{}", self.host, self.snapshot.port);
        let listener = TcpListener::bind(&address)?;
        listener.set_nonblocking(true)?;
        println!("[+] Servidor escuchando en {}", listener.local_addr()?);
        self.listener = Some(listener);
        Ok(())
    }

    /// Dirección local real del listener (resuelve puerto 0)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Ejecuta accept loop, recargas y apagado; retorna al terminar
    pub fn run(&mut self) -> io::Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }

        let mut generation = Generation::start(
            1,
            &self.snapshot,
            self.handler,
            Arc::clone(&self.metrics),
        );
        self.metrics
            .record_generation(1, self.snapshot.pool_size, self.snapshot.queue_size);

        loop {
            // Flags una vez por iteración: latencia de observación acotada
            if self.triggers.terminate_requested() {
                println!("[*] Terminación solicitada: dejando de aceptar conexiones");
                break;
            }
            if self.triggers.take_reload() {
                self.handle_reload(&mut generation);
                continue;
            }

            // self.listener siempre es Some después del bind
            let accepted = self.listener.as_ref().unwrap().accept();
            match accepted {
                Ok((stream, peer)) => {
                    self.metrics.record_accepted();
                    // Backpressure: con la cola llena, este enqueue bloquea
                    // al acceptor hasta que un worker haga espacio
                    if let Err(e) = generation.submit(stream) {
                        self.metrics.record_rejected();
                        eprintln!("❌ Conexión de {} rechazada: {}", peer, e);
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(POLL_INTERVAL);
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {
                    // Señal durante el accept: los flags se revisan arriba
                }
                Err(e) => {
                    if self.triggers.terminate_requested() {
                        // Accept fallando en pleno apagado es la señal
                        // terminal esperada, no un error
                        break;
                    }
                    eprintln!("💥 Error fatal en accept: {}", e);
                    generation.shutdown();
                    return Err(e);
                }
            }
        }

        self.shutdown(generation);
        Ok(())
    }

    /// Transición de recarga: `Active(g)` → `Active(g+1)`
    ///
    /// Si el snapshot nuevo no se puede cargar o no valida, la recarga se
    /// aborta y la generación actual sigue sirviendo.
    fn handle_reload(&mut self, active: &mut Generation) {
        println!("[*] Recargando configuración desde {}", self.config_path);

        let mut new_snapshot = match ConfigSnapshot::load_validated(&self.config_path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                eprintln!(
                    "❌ Recarga abortada ({}); la generación {} sigue activa",
                    e,
                    active.id()
                );
                self.metrics.record_failed_reload();
                return;
            }
        };

        // Construir primero, swap después, teardown al final: el acceptor
        // nunca se queda sin generación donde encolar
        let next_id = active.id() + 1;
        let next = Generation::start(
            next_id,
            &new_snapshot,
            self.handler,
            Arc::clone(&self.metrics),
        );
        let old = std::mem::replace(active, next);

        // La generación vieja drena lo suyo y sus workers terminan
        old.shutdown();

        if new_snapshot.port != self.snapshot.port && !self.rebind(new_snapshot.port) {
            // Migración fallida: conservar el puerto anterior en el snapshot
            // activo para que la próxima recarga reintente el rebind
            new_snapshot.port = self.snapshot.port;
        }

        self.metrics.record_reload();
        self.metrics
            .record_generation(next_id, new_snapshot.pool_size, new_snapshot.queue_size);
        self.snapshot = new_snapshot;

        println!("[+] Recarga aplicada: generación {} en servicio", next_id);
    }

    /// Cambia el listener de puerto tras una recarga
    ///
    /// Un fallo de bind es recuperable: se conserva el listener anterior y
    /// se retorna false para que el caller no dé el puerto por migrado.
    fn rebind(&mut self, new_port: u16) -> bool {
        let address = format!("{}:{}", self.host, new_port);
        let bound = TcpListener::bind(&address).and_then(|listener| {
            listener.set_nonblocking(true)?;
            Ok(listener)
        });

        match bound {
            Ok(listener) => {
                println!("[+] Listener migrado a {}", address);
                self.listener = Some(listener);
                true
            }
            Err(e) => {
                eprintln!(
                    "❌ No se pudo enlazar {}: {}; se mantiene el puerto anterior y se reintentará en la próxima recarga",
                    address, e
                );
                false
            }
        }
    }

    /// Estado del servidor en JSON: métricas más el snapshot activo
    pub fn status_json(&self) -> serde_json::Value {
        let mut status = self.metrics.get_metrics_json();
        status["config"] =
            serde_json::to_value(&self.snapshot).unwrap_or(serde_json::Value::Null);
        status
    }

    /// Transición terminal: drena la generación final y libera recursos
    fn shutdown(&mut self, generation: Generation) {
        println!(
            "[*] Apagando: drenando {} conexiones en cola y esperando workers...",
            generation.queue_len()
        );
        generation.shutdown();

        // Cerrar el socket de escucha
        self.listener = None;

        println!(
            "📊 Estado final:\n{}",
            serde_json::to_string_pretty(&self.status_json())
                .unwrap_or_else(|_| "{}".to_string())
        );
        println!("[+] Servidor terminado");
    }
}
