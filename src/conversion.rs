//! Funciones de conversión para datos del sensor MPU6050
//!
//! Este módulo proporciona funciones para convertir datos raw del sensor
//! a unidades físicas apropiadas como aceleraciones en G, velocidad angular
//! en grados por segundo, y temperatura en grados Celsius.

use crate::types::data_defs::{TEMP_LSB_PER_C, TEMP_OFFSET_C};
use crate::types::{AccelFullScale, GyroFullScale};

/// Aceleración de la gravedad en m/s²
pub const GRAVITY_MSS: f64 = 9.80665;

/// Factor de escala del acelerómetro (g por LSB)
#[inline]
pub fn accel_scale(fs: AccelFullScale) -> f64 {
    1.0 / fs.lsb_per_g()
}

/// Factor de escala del giroscopio (grados/segundo por LSB)
#[inline]
pub fn gyro_scale(fs: GyroFullScale) -> f64 {
    1.0 / fs.lsb_per_dps()
}

/// Factor de escala de la temperatura (°C por LSB, sin el offset)
#[inline]
pub fn temp_scale() -> f64 {
    1.0 / TEMP_LSB_PER_C
}

/// Convierte datos brutos de acelerómetro a G según la escala configurada
///
/// # Arguments
/// * `raw` - Valores brutos del acelerómetro [x, y, z]
/// * `scale` - Configuración de escala completa del acelerómetro
///
/// # Returns
/// Aceleración en G [x, y, z]
pub fn accel_raw_to_g(raw: [i16; 3], scale: AccelFullScale) -> [f64; 3] {
    let factor = accel_scale(scale);
    [
        raw[0] as f64 * factor,
        raw[1] as f64 * factor,
        raw[2] as f64 * factor,
    ]
}

/// Convierte datos brutos de giroscopio a grados/segundo según la escala configurada
///
/// # Arguments
/// * `raw` - Valores brutos del giroscopio [x, y, z]
/// * `scale` - Configuración de escala completa del giroscopio
///
/// # Returns
/// Velocidad angular en grados/segundo [x, y, z]
pub fn gyro_raw_to_dps(raw: [i16; 3], scale: GyroFullScale) -> [f64; 3] {
    let factor = gyro_scale(scale);
    [
        raw[0] as f64 * factor,
        raw[1] as f64 * factor,
        raw[2] as f64 * factor,
    ]
}

/// Convierte datos brutos de temperatura a grados Celsius
///
/// # Arguments
/// * `raw` - Valor bruto del sensor de temperatura
///
/// # Returns
/// Temperatura en grados Celsius
pub fn temp_raw_to_celsius(raw: i16) -> f64 {
    // Temp °C = TEMP_OUT / 340 + 36.53
    raw as f64 * temp_scale() + TEMP_OFFSET_C
}

/// Convierte una aceleración en G a m/s²
#[inline]
pub fn g_to_mss(value: f64) -> f64 {
    value * GRAVITY_MSS
}
