//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define las dos piezas de configuración del servidor:
//!
//! - [`CliArgs`]: opciones de línea de comandos (ruta del archivo de
//!   configuración, host) parseadas con clap.
//! - [`ConfigSnapshot`]: valor inmutable `{port, pool_size, queue_size}`
//!   producido al leer el archivo `KEY=VALUE`. Cada recarga produce un
//!   snapshot nuevo; el snapshot activo nunca se muta.
//!
//! ## Formato del archivo
//!
//! ```text
//! PORT=8080
//! THREAD_POOL_SIZE=4
//! QUEUE_SIZE=16
//! ```
//!
//! Claves no reconocidas se ignoran. Claves ausentes conservan su valor
//! por defecto. Un archivo ilegible o un valor no numérico es un error:
//! fatal en el arranque, recuperable (se aborta la recarga) en caliente.

use clap::Parser;
use serde::Serialize;
use std::fs;

/// Opciones de línea de comandos del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "pool_server")]
#[command(about = "Servidor TCP concurrente con cola acotada y pool de workers")]
#[command(version = "0.1.0")]
pub struct CliArgs {
    /// Ruta del archivo de configuración (formato KEY=VALUE)
    #[arg(short, long, default_value = "config.cfg", env = "POOL_SERVER_CONFIG")]
    pub config_path: String,

    /// Host/IP en el que escucha el servidor
    #[arg(long, default_value = "127.0.0.1", env = "POOL_SERVER_HOST")]
    pub host: String,
}

impl CliArgs {
    /// Crea las opciones parseando argumentos CLI
    pub fn new() -> Self {
        CliArgs::parse()
    }
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            config_path: "config.cfg".to_string(),
            host: "127.0.0.1".to_string(),
        }
    }
}

/// Snapshot inmutable de configuración
///
/// Una recarga construye un snapshot nuevo y una generación nueva de
/// pool+cola; el snapshot viejo se descarta junto con su generación.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSnapshot {
    /// Puerto en el que escucha el servidor (0 = efímero, útil en tests)
    pub port: u16,

    /// Número de workers del pool
    pub pool_size: usize,

    /// Capacidad de la cola de conexiones
    pub queue_size: usize,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            port: 8080,
            pool_size: 4,
            queue_size: 16,
        }
    }
}

impl ConfigSnapshot {
    /// Lee un snapshot desde un archivo `KEY=VALUE`
    ///
    /// Retorna Err si el archivo no se puede leer o contiene un valor
    /// no numérico para una clave reconocida.
    pub fn load(path: &str) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("cannot read config file '{}': {}", path, e))?;
        Self::parse(&contents)
    }

    /// Parsea el contenido de un archivo de configuración
    pub fn parse(contents: &str) -> Result<Self, String> {
        let mut snapshot = ConfigSnapshot::default();

        for line in contents.lines() {
            let line = line.trim();

            // Líneas vacías y comentarios
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "PORT" => {
                    snapshot.port = value
                        .parse()
                        .map_err(|_| format!("invalid value for PORT: '{}'", value))?;
                }
                "THREAD_POOL_SIZE" => {
                    snapshot.pool_size = value
                        .parse()
                        .map_err(|_| format!("invalid value for THREAD_POOL_SIZE: '{}'", value))?;
                }
                "QUEUE_SIZE" => {
                    snapshot.queue_size = value
                        .parse()
                        .map_err(|_| format!("invalid value for QUEUE_SIZE: '{}'", value))?;
                }
                // Claves no reconocidas se ignoran
                _ => {}
            }
        }

        Ok(snapshot)
    }

    /// Lee y valida en un solo paso (lo que usan arranque y recarga)
    pub fn load_validated(path: &str) -> Result<Self, String> {
        let snapshot = Self::load(path)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Valida el snapshot
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.pool_size == 0 {
            return Err("THREAD_POOL_SIZE must be >= 1".to_string());
        }
        if self.queue_size == 0 {
            return Err("QUEUE_SIZE must be >= 1".to_string());
        }
        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self, host: &str) {
        println!("╔══════════════════════════════════════════╗");
        println!("║       Pool Server Configuration          ║");
        println!("╚══════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}:{}", host, self.port);
        println!();
        println!("👷 Worker Pool & Queue:");
        println!("   Workers:      {}", self.pool_size);
        println!("   Queue cap:    {}", self.queue_size);
        println!();
        println!("═══════════════════════════════════════════");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Helper: escribe un archivo de configuración temporal único
    fn write_temp_config(name: &str, contents: &str) -> String {
        let path = std::env::temp_dir()
            .join(format!("pool_server_cfg_{}_{}", std::process::id(), name));
        let mut file = fs::File::create(&path).expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write temp config");
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_default_snapshot() {
        let snapshot = ConfigSnapshot::default();
        assert_eq!(snapshot.port, 8080);
        assert_eq!(snapshot.pool_size, 4);
        assert_eq!(snapshot.queue_size, 16);
    }

    #[test]
    fn test_parse_all_keys() {
        let snapshot =
            ConfigSnapshot::parse("PORT=9090\nTHREAD_POOL_SIZE=8\nQUEUE_SIZE=32\n").unwrap();
        assert_eq!(snapshot.port, 9090);
        assert_eq!(snapshot.pool_size, 8);
        assert_eq!(snapshot.queue_size, 32);
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let snapshot = ConfigSnapshot::parse("PORT=7000\nMAX_CLIENTS=99\nFOO=bar\n").unwrap();
        assert_eq!(snapshot.port, 7000);
        // Claves desconocidas no afectan el resto
        assert_eq!(snapshot.pool_size, 4);
    }

    #[test]
    fn test_parse_ignores_comments_and_blank_lines() {
        let snapshot = ConfigSnapshot::parse("# comentario\n\n  PORT = 7001  \n").unwrap();
        assert_eq!(snapshot.port, 7001);
    }

    #[test]
    fn test_parse_missing_keys_keep_defaults() {
        let snapshot = ConfigSnapshot::parse("PORT=7002\n").unwrap();
        assert_eq!(snapshot.pool_size, 4);
        assert_eq!(snapshot.queue_size, 16);
    }

    #[test]
    fn test_parse_invalid_value_is_error() {
        let result = ConfigSnapshot::parse("THREAD_POOL_SIZE=cuatro\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("THREAD_POOL_SIZE"));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = ConfigSnapshot::load("/definitely/not/a/real/config.cfg");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("cannot read config file"));
    }

    #[test]
    fn test_load_from_file() {
        let path = write_temp_config("load", "PORT=7100\nTHREAD_POOL_SIZE=2\nQUEUE_SIZE=5\n");
        let snapshot = ConfigSnapshot::load(&path).unwrap();
        assert_eq!(snapshot.port, 7100);
        assert_eq!(snapshot.pool_size, 2);
        assert_eq!(snapshot.queue_size, 5);
        let _ = fs::remove_file(&path);
    }

    // ==================== Validación ====================

    #[test]
    fn test_validate_success() {
        assert!(ConfigSnapshot::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_pool_size() {
        let snapshot = ConfigSnapshot {
            pool_size: 0,
            ..ConfigSnapshot::default()
        };
        let result = snapshot.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("THREAD_POOL_SIZE"));
    }

    #[test]
    fn test_validate_zero_queue_size() {
        let snapshot = ConfigSnapshot {
            queue_size: 0,
            ..ConfigSnapshot::default()
        };
        let result = snapshot.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("QUEUE_SIZE"));
    }

    #[test]
    fn test_load_validated_rejects_zero_workers() {
        let path = write_temp_config("zero_workers", "THREAD_POOL_SIZE=0\n");
        assert!(ConfigSnapshot::load_validated(&path).is_err());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_print_summary() {
        // No debe hacer panic
        ConfigSnapshot::default().print_summary("127.0.0.1");
    }

    #[test]
    fn test_cli_args_default() {
        let args = CliArgs::default();
        assert_eq!(args.config_path, "config.cfg");
        assert_eq!(args.host, "127.0.0.1");
    }
}
