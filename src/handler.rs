//! # Handler de Conexiones
//! src/handler.rs
//!
//! El colaborador que convierte una conexión en una respuesta. El pool lo
//! invoca con ownership exclusivo del `TcpStream`; al retornar (con éxito o
//! con error) el stream se libera y el socket se cierra.
//!
//! El handler por defecto es deliberadamente trivial: lee el request y
//! responde un texto fijo. Es un punto de extensión, no el núcleo; el
//! núcleo es la cola + el pool que lo invocan.

use std::io::{Read, Write};
use std::net::TcpStream;

/// Handler de conexiones del servidor
///
/// Recibe ownership exclusivo de la conexión durante la llamada.
pub type ConnHandler = fn(TcpStream) -> Result<(), String>;

const READ_BUFFER_SIZE: usize = 1024;

/// Handler por defecto: respuesta fija
///
/// Lee el request; `CONNECT` recibe `504 Gateway Timeout`, cualquier otro
/// método recibe `200 OK` con `Hello, world!`. Un fallo de lectura o
/// escritura afecta solo a esta conexión.
pub fn hello_handler(mut stream: TcpStream) -> Result<(), String> {
    let mut buffer = [0u8; READ_BUFFER_SIZE];

    let bytes_received = stream
        .read(&mut buffer)
        .map_err(|e| format!("recv failed: {}", e))?;

    if bytes_received == 0 {
        // El cliente cerró sin enviar nada
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buffer[..bytes_received]);

    let response: &str = if request.starts_with("CONNECT") {
        "HTTP/1.1 504 Gateway Timeout\r\n\
         Content-Type: text/plain\r\n\
         Content-Length: 15\r\n\
         \r\n\
         Gateway Timeout"
    } else {
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/plain\r\n\
         Content-Length: 13\r\n\
         \r\n\
         Hello, world!"
    };

    stream
        .write_all(response.as_bytes())
        .map_err(|e| format!("send failed: {}", e))?;
    stream.flush().map_err(|e| format!("flush failed: {}", e))?;

    Ok(())
    // stream se libera aquí: el socket queda cerrado
}
