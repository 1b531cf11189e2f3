//! Biblioteca Rust para el sensor de movimiento InvenSense MPU6050
//!
//! Esta biblioteca proporciona una interfaz para controlar el sensor MPU6050,
//! un IMU de 6 ejes con giroscopio y acelerómetro, desde un host (p. ej. Linux):
//! configuración de muestreo, filtro y escalas, lectura por lotes de la FIFO,
//! auto-test de fábrica y calibración de offsets.
//!
//! ```no_run
//! # #[cfg(feature = "linux")]
//! # fn main() -> Result<(), mpu6050_rs::Mpu6050Error> {
//! use mpu6050_rs::InitMode;
//!
//! let mut device = mpu6050_rs::open_linux_device("/dev/i2c-1", InitMode::Reset)?;
//! device.read_data()?;
//! println!("accel: {:?} g", device.accel());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "linux"))]
//! # fn main() {}
//! ```

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::blocking::i2c;

// Importaciones internas
pub mod base;
pub mod calibration;
pub mod channels;
pub mod config;
pub mod conversion;
pub mod device;
pub mod diag;
pub mod fifo;
pub mod interface;
pub mod register;
pub mod selftest;
pub mod storage;
pub mod types;

// Re-exports públicos
pub use channels::ChannelKind;
pub use conversion::{accel_raw_to_g, gyro_raw_to_dps, temp_raw_to_celsius};
pub use device::{Mpu6050, Mpu6050Builder, Mpu6050Error};
pub use selftest::{calibrate, run_self_test, SelfTestReport};
pub use storage::{FileStore, MemoryStore, ParameterStore};
pub use types::{AccelFullScale, ClockSource, GyroFullScale, InitMode};

use crate::interface::I2cInterface;

/// Crea e inicializa un MPU6050 sobre un bus I2C, con parámetros en `mpu6050_cfg.bin`
pub fn new_i2c_device<I, D, E>(
    i2c: I,
    address: u8,
    delay: D,
    mode: InitMode,
) -> Result<Mpu6050<I2cInterface<I>, D, FileStore>, Mpu6050Error>
where
    I: i2c::Write<Error = E> + i2c::WriteRead<Error = E>,
    E: core::fmt::Debug,
    D: DelayUs<u32> + DelayMs<u32>,
{
    let interface = I2cInterface::new(i2c, address);
    Mpu6050::builder(interface, delay).mode(mode).build()
}

/// Abre `/dev/i2c-N` y crea el dispositivo en la dirección por defecto (0x68)
#[cfg(feature = "linux")]
pub fn open_linux_device(
    path: &str,
    mode: InitMode,
) -> Result<
    Mpu6050<I2cInterface<linux_embedded_hal::I2cdev>, linux_embedded_hal::Delay, FileStore>,
    Mpu6050Error,
> {
    // Como mínimo "/dev/x"
    if path.len() < 6 {
        return Err(Mpu6050Error::InvalidArgument);
    }
    let i2c = linux_embedded_hal::I2cdev::new(path).map_err(|e| {
        log::error!("Error al abrir {}: {:?}", path, e);
        Mpu6050Error::BindFailure
    })?;
    new_i2c_device(
        i2c,
        types::data_defs::DEFAULT_I2C_ADDRESS,
        linux_embedded_hal::Delay,
        mode,
    )
}
