//! Definiciones de tipos y constantes comunes para el MPU6050

use crate::device::Mpu6050Error;

/// Escalas completas disponibles para el giroscopio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GyroFullScale {
    /// ±250 dps
    Fs250Dps = 0,
    /// ±500 dps
    Fs500Dps = 1,
    /// ±1000 dps
    Fs1000Dps = 2,
    /// ±2000 dps
    Fs2000Dps = 3,
}

impl Default for GyroFullScale {
    fn default() -> Self {
        GyroFullScale::Fs250Dps
    }
}

// Conversión desde el campo FS_SEL ya desplazado
impl From<u8> for GyroFullScale {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => GyroFullScale::Fs250Dps,
            1 => GyroFullScale::Fs500Dps,
            2 => GyroFullScale::Fs1000Dps,
            _ => GyroFullScale::Fs2000Dps,
        }
    }
}

impl GyroFullScale {
    /// Selecciona la escala a partir del rango en grados/segundo (250, 500, 1000 o 2000)
    pub fn from_dps(dps: u32) -> Result<Self, Mpu6050Error> {
        match dps {
            250 => Ok(GyroFullScale::Fs250Dps),
            500 => Ok(GyroFullScale::Fs500Dps),
            1000 => Ok(GyroFullScale::Fs1000Dps),
            2000 => Ok(GyroFullScale::Fs2000Dps),
            _ => Err(Mpu6050Error::InvalidArgument),
        }
    }

    /// Decodifica la escala desde el valor completo de GYRO_CONFIG
    pub fn from_register(value: u8) -> Self {
        Self::from((value & bits::FS_SEL) >> 3)
    }

    /// Bits FS_SEL para GYRO_CONFIG
    pub fn register_bits(self) -> u8 {
        (self as u8) << 3
    }

    /// Rango en grados/segundo
    pub fn range_dps(self) -> u32 {
        match self {
            GyroFullScale::Fs250Dps => 250,
            GyroFullScale::Fs500Dps => 500,
            GyroFullScale::Fs1000Dps => 1000,
            GyroFullScale::Fs2000Dps => 2000,
        }
    }

    /// LSB por grado/segundo
    pub fn lsb_per_dps(self) -> f64 {
        match self {
            GyroFullScale::Fs250Dps => 131.0,
            GyroFullScale::Fs500Dps => 65.5,
            GyroFullScale::Fs1000Dps => 32.8,
            GyroFullScale::Fs2000Dps => 16.4,
        }
    }
}

/// Escalas completas disponibles para el acelerómetro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AccelFullScale {
    /// ±2g
    Fs2G = 0,
    /// ±4g
    Fs4G = 1,
    /// ±8g
    Fs8G = 2,
    /// ±16g
    Fs16G = 3,
}

impl Default for AccelFullScale {
    fn default() -> Self {
        AccelFullScale::Fs2G
    }
}

// Conversión desde el campo AFS_SEL ya desplazado
impl From<u8> for AccelFullScale {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => AccelFullScale::Fs2G,
            1 => AccelFullScale::Fs4G,
            2 => AccelFullScale::Fs8G,
            _ => AccelFullScale::Fs16G,
        }
    }
}

impl AccelFullScale {
    /// Selecciona la escala a partir del rango en g (2, 4, 8 o 16)
    pub fn from_g(g: u32) -> Result<Self, Mpu6050Error> {
        match g {
            2 => Ok(AccelFullScale::Fs2G),
            4 => Ok(AccelFullScale::Fs4G),
            8 => Ok(AccelFullScale::Fs8G),
            16 => Ok(AccelFullScale::Fs16G),
            _ => Err(Mpu6050Error::InvalidArgument),
        }
    }

    /// Decodifica la escala desde el valor completo de ACCEL_CONFIG
    pub fn from_register(value: u8) -> Self {
        Self::from((value & bits::AFS_SEL) >> 3)
    }

    /// Bits AFS_SEL para ACCEL_CONFIG
    pub fn register_bits(self) -> u8 {
        (self as u8) << 3
    }

    /// Rango en g
    pub fn range_g(self) -> u32 {
        match self {
            AccelFullScale::Fs2G => 2,
            AccelFullScale::Fs4G => 4,
            AccelFullScale::Fs8G => 8,
            AccelFullScale::Fs16G => 16,
        }
    }

    /// LSB por g
    pub fn lsb_per_g(self) -> f64 {
        match self {
            AccelFullScale::Fs2G => 16384.0,
            AccelFullScale::Fs4G => 8192.0,
            AccelFullScale::Fs8G => 4096.0,
            AccelFullScale::Fs16G => 2048.0,
        }
    }
}

/// Fuente de reloj seleccionable en PWR_MGMT_1 (CLKSEL)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ClockSource {
    /// Oscilador interno de 8 MHz
    Internal8MHz = 0,
    /// PLL con referencia al eje X del giroscopio
    PllGyroX = 1,
    /// PLL con referencia al eje Y del giroscopio
    PllGyroY = 2,
    /// PLL con referencia al eje Z del giroscopio
    #[default]
    PllGyroZ = 3,
}

impl TryFrom<u8> for ClockSource {
    type Error = Mpu6050Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ClockSource::Internal8MHz),
            1 => Ok(ClockSource::PllGyroX),
            2 => Ok(ClockSource::PllGyroY),
            3 => Ok(ClockSource::PllGyroZ),
            _ => Err(Mpu6050Error::InvalidArgument),
        }
    }
}

/// Modo de arranque del driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitMode {
    /// Escribe la configuración de fábrica y pone a cero la calibración
    #[default]
    Reset,
    /// Carga configuración y calibración persistidas sin reescribir el hardware
    Restore,
}

/// Entrada de la tabla del filtro paso bajo (DLPF_CFG)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterSettings {
    /// Valor DLPF_CFG (0..=6)
    pub dlpf: u8,
    pub accel_bandwidth_hz: u32,
    pub accel_delay_ms: f64,
    pub gyro_bandwidth_hz: u32,
    pub gyro_delay_ms: f64,
    /// Frecuencia de salida del giroscopio en Hz
    pub gyro_output_rate_hz: u32,
}

const FILTER_TABLE: [FilterSettings; 7] = [
    FilterSettings { dlpf: 0, accel_bandwidth_hz: 260, accel_delay_ms: 0.0, gyro_bandwidth_hz: 256, gyro_delay_ms: 0.98, gyro_output_rate_hz: 8000 },
    FilterSettings { dlpf: 1, accel_bandwidth_hz: 184, accel_delay_ms: 2.0, gyro_bandwidth_hz: 188, gyro_delay_ms: 1.9, gyro_output_rate_hz: 1000 },
    FilterSettings { dlpf: 2, accel_bandwidth_hz: 94, accel_delay_ms: 3.0, gyro_bandwidth_hz: 98, gyro_delay_ms: 2.8, gyro_output_rate_hz: 1000 },
    FilterSettings { dlpf: 3, accel_bandwidth_hz: 44, accel_delay_ms: 4.9, gyro_bandwidth_hz: 42, gyro_delay_ms: 4.8, gyro_output_rate_hz: 1000 },
    FilterSettings { dlpf: 4, accel_bandwidth_hz: 21, accel_delay_ms: 8.5, gyro_bandwidth_hz: 20, gyro_delay_ms: 8.3, gyro_output_rate_hz: 1000 },
    FilterSettings { dlpf: 5, accel_bandwidth_hz: 10, accel_delay_ms: 13.8, gyro_bandwidth_hz: 10, gyro_delay_ms: 13.4, gyro_output_rate_hz: 1000 },
    FilterSettings { dlpf: 6, accel_bandwidth_hz: 5, accel_delay_ms: 19.0, gyro_bandwidth_hz: 5, gyro_delay_ms: 18.6, gyro_output_rate_hz: 1000 },
];

/// Busca la entrada de la tabla del filtro. El valor 7 está reservado.
pub fn filter_settings(dlpf: u8) -> Result<FilterSettings, Mpu6050Error> {
    FILTER_TABLE
        .get(dlpf as usize)
        .copied()
        .ok_or(Mpu6050Error::UnsupportedFeature("DLPF_CFG reservado"))
}

/// Frecuencia de despertar en modo ciclo (LP_WAKE_CTRL), 0 Hz si el ciclo está desactivado
pub fn wake_frequency_hz(cycle: bool, lp_wake_ctrl: u8) -> f64 {
    if !cycle {
        return 0.0;
    }
    match lp_wake_ctrl & 0x03 {
        0 => 1.2,
        1 => 5.0,
        2 => 20.0,
        _ => 40.0,
    }
}

/// Frecuencias de muestreo admitidas por `set_sample_rate`
pub const SUPPORTED_SAMPLE_RATES: [u32; 5] = [500, 250, 200, 100, 50];

/// Bits útiles para configuración y control
pub mod bits {
    // SELF_TEST_X/Y/Z/A
    pub const XA_TEST_42: u8 = 0xE0;
    pub const YA_TEST_42: u8 = 0xE0;
    pub const ZA_TEST_42: u8 = 0xE0;
    pub const XG_TEST: u8 = 0x1F;
    pub const YG_TEST: u8 = 0x1F;
    pub const ZG_TEST: u8 = 0x1F;
    pub const XA_TEST_10: u8 = 0x30;
    pub const YA_TEST_10: u8 = 0x0C;
    pub const ZA_TEST_10: u8 = 0x03;

    // CONFIG
    pub const EXT_SYNC_SET: u8 = 0x38;
    pub const DLPF_CFG: u8 = 0x07;

    // GYRO_CONFIG / ACCEL_CONFIG
    pub const XG_ST: u8 = 0x80;
    pub const YG_ST: u8 = 0x40;
    pub const ZG_ST: u8 = 0x20;
    pub const FS_SEL: u8 = 0x18;
    pub const XA_ST: u8 = 0x80;
    pub const YA_ST: u8 = 0x40;
    pub const ZA_ST: u8 = 0x20;
    pub const AFS_SEL: u8 = 0x18;

    // FIFO_EN
    pub const TEMP_FIFO_EN: u8 = 0x80;
    pub const XG_FIFO_EN: u8 = 0x40;
    pub const YG_FIFO_EN: u8 = 0x20;
    pub const ZG_FIFO_EN: u8 = 0x10;
    pub const GYRO_FIFO_EN: u8 = XG_FIFO_EN | YG_FIFO_EN | ZG_FIFO_EN;
    pub const ACCEL_FIFO_EN: u8 = 0x08;
    pub const SLV2_FIFO_EN: u8 = 0x04;
    pub const SLV1_FIFO_EN: u8 = 0x02;
    pub const SLV0_FIFO_EN: u8 = 0x01;

    // I2C_MST_CTRL
    pub const SLV3_FIFO_EN: u8 = 0x20;

    // INT_PIN_CFG
    pub const FSYNC_INT_EN: u8 = 0x04;

    // INT_ENABLE
    pub const FIFO_OFLOW_EN: u8 = 0x10;
    pub const I2C_MST_INT_EN: u8 = 0x08;
    pub const DATA_RDY_EN: u8 = 0x01;

    // USER_CTRL
    pub const FIFO_EN: u8 = 0x40;
    pub const I2C_MST_EN: u8 = 0x20;
    pub const I2C_IF_DIS: u8 = 0x10;
    pub const FIFO_RESET: u8 = 0x04;
    pub const I2C_MST_RESET: u8 = 0x02;
    pub const SIG_COND_RESET: u8 = 0x01;

    // PWR_MGMT_1
    pub const DEVICE_RESET: u8 = 0x80;
    pub const SLEEP: u8 = 0x40;
    pub const CYCLE: u8 = 0x20;
    pub const TEMP_DIS: u8 = 0x08;
    pub const CLKSEL: u8 = 0x07;

    // PWR_MGMT_2
    pub const LP_WAKE_CTRL: u8 = 0xC0;
    pub const STBY_XA: u8 = 0x20;
    pub const STBY_YA: u8 = 0x10;
    pub const STBY_ZA: u8 = 0x08;
    pub const STBY_XG: u8 = 0x04;
    pub const STBY_YG: u8 = 0x02;
    pub const STBY_ZG: u8 = 0x01;
}

/// Data Definitions
pub mod data_defs {
    /// Dirección I2C por defecto (AD0 a nivel bajo)
    pub const DEFAULT_I2C_ADDRESS: u8 = 0x68;
    /// Bytes a partir de los cuales se considera que la FIFO ha desbordado
    pub const FIFO_MAX_BYTES: u16 = 1023;
    /// Número de slots del buffer de muestras (el slot 0 está reservado)
    pub const MAX_SLOTS: usize = 32;
    /// Capacidad de la imagen de registros
    pub const IMAGE_SLOTS: usize = 16;
    pub const TEMP_LSB_PER_C: f64 = 340.0;
    pub const TEMP_OFFSET_C: f64 = 36.53;
    /// Muestras por pasada de calibración
    pub const DEFAULT_CALIBRATION_SAMPLES: u32 = 1000;
    /// Muestras por fase de auto-test
    pub const SELF_TEST_SAMPLES: u32 = 100;
    /// Desviación máxima (en %) respecto al trimado de fábrica
    pub const SELF_TEST_MAX_SHIFT_PCT: f64 = 14.0;
    /// Espera tras activar o desactivar el estímulo de auto-test
    pub const SELF_TEST_SETTLE_MS: u32 = 1000;
    /// Espera tras un reset del dispositivo
    pub const RESET_WAIT_MS: u32 = 100;
    /// Nombre del fichero de parámetros por defecto
    pub const DEFAULT_PARAMETER_FILE: &str = "mpu6050_cfg.bin";
}
