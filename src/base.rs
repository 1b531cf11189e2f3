//! Funcionalidades y traits base para módulos del sensor

use std::time::Instant;

/// Trait para obtener un timestamp en microsegundos.
/// Permite implementar diferentes fuentes (sistema, reloj simulado en pruebas...).
pub trait TimeSource {
    /// Retorna el timestamp (en microsegundos)
    fn get_timestamp_us(&self) -> u64;
}

/// Reloj monótono del sistema; cuenta desde su creación.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn get_timestamp_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}
