//! Registro de calibración
//!
//! Guarda los coeficientes por slot, los offsets hardware de los seis ejes
//! inerciales y los bias medidos por la última calibración. Se persiste junto a
//! la imagen de registros.

use bytemuck::{Pod, Zeroable};

use crate::types::data_defs::{DEFAULT_CALIBRATION_SAMPLES, MAX_SLOTS};

/// Índices de los ejes inerciales en `original_offsets` / `custom_offsets`
pub mod axis {
    pub const XA: usize = 0;
    pub const YA: usize = 1;
    pub const ZA: usize = 2;
    pub const XG: usize = 3;
    pub const YG: usize = 4;
    pub const ZG: usize = 5;
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CalibrationRecord {
    /// Offset por slot
    pub offset: [f64; MAX_SLOTS],
    /// Ganancia por slot
    pub gain: [f64; MAX_SLOTS],
    /// Deriva por slot
    pub drift: [f64; MAX_SLOTS],
    /// Bias del acelerómetro en g [x, y, z]
    pub accel_bias: [f64; 3],
    /// Bias del giroscopio en °/s [x, y, z]
    pub gyro_bias: [f64; 3],
    pub accel_magnitude_bias: f64,
    pub gyro_magnitude_bias: f64,
    /// Valores de los registros de offset leídos del dispositivo (Xa, Ya, Za, Xg, Yg, Zg)
    pub original_offsets: [i16; 6],
    /// Valores programados por la calibración
    pub custom_offsets: [i16; 6],
    /// Muestras por pasada de calibración
    pub samples: u32,
    _reserved: u32,
}

impl Default for CalibrationRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationRecord {
    /// Registro neutro: ganancia 1, offset y deriva 0, sin bias
    pub fn new() -> Self {
        Self {
            gain: [1.0; MAX_SLOTS],
            samples: DEFAULT_CALIBRATION_SAMPLES,
            ..Self::zeroed()
        }
    }

    /// Prepara una nueva calibración.
    ///
    /// Los bias de magnitud se conservan: la pasada gruesa usa el de la
    /// calibración anterior.
    pub fn reset_for_calibration(&mut self, original_offsets: [i16; 6]) {
        self.original_offsets = original_offsets;
        self.custom_offsets = [0; 6];
        self.accel_bias = [0.0; 3];
        self.gyro_bias = [0.0; 3];
    }
}
