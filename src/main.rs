//! # Pool Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor. Solo los errores fatales de arranque
//! (configuración ilegible, bind fallido) terminan el proceso con código
//! distinto de cero; todo lo demás se contiene y se registra.

use pool_server::config::{CliArgs, ConfigSnapshot};
use pool_server::server::Server;
use pool_server::signals::Triggers;

fn main() {
    println!("=================================");
    println!("  Pool Server");
    println!("  Principios de Sistemas Operativos");
    println!("=================================\n");

    let args = CliArgs::new();

    // Configuración ilegible en el arranque es fatal
    let snapshot = match ConfigSnapshot::load_validated(&args.config_path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("💥 Error fatal de configuración: {}", e);
            std::process::exit(1);
        }
    };
    snapshot.print_summary(&args.host);

    // SIGHUP recarga, SIGTERM/SIGINT apagan
    let triggers = match Triggers::install() {
        Ok(triggers) => triggers,
        Err(e) => {
            eprintln!("💥 Error fatal instalando señales: {}", e);
            std::process::exit(1);
        }
    };

    let mut server = Server::new(args, snapshot, triggers);

    // bind separado para que el fallo de socket sea un error de arranque
    if let Err(e) = server.bind() {
        eprintln!("💥 Error fatal al enlazar el socket: {}", e);
        std::process::exit(1);
    }

    // Esto bloquea hasta la terminación
    if let Err(e) = server.run() {
        eprintln!("💥 Error fatal: {}", e);
        std::process::exit(1);
    }
}
