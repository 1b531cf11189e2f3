//! Módulo de abstracción para interfaces de comunicación con el dispositivo MPU6050

use embedded_hal::blocking::i2c;

#[cfg(feature = "linux")]
use linux_embedded_hal::i2cdev::linux::LinuxI2CError;

/// Error genérico para interfaces de comunicación
#[derive(Debug, Clone)]
pub enum InterfaceError<E> {
    /// Error de comunicación I2C
    I2cError(E),
    /// Parámetro inválido
    InvalidParameter,
}

#[cfg(feature = "linux")]
impl From<LinuxI2CError> for InterfaceError<LinuxI2CError> {
    fn from(error: LinuxI2CError) -> Self {
        InterfaceError::I2cError(error)
    }
}

/// Trait para abstraer la comunicación con el dispositivo MPU6050.
///
/// Cada llamada es atómica y bloqueante.
pub trait Interface {
    /// Tipo de error que puede producir la interfaz
    type Error: core::fmt::Debug;

    /// Escribe uno o varios bytes a partir de un registro
    fn write_reg(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Lee uno o varios bytes a partir de un registro
    fn read_reg(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Self::Error>;

    /// Lee un byte
    fn read_byte(&mut self, reg: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_reg(reg, &mut buf)?;
        Ok(buf[0])
    }

    /// Escribe un byte
    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), Self::Error> {
        self.write_reg(reg, &[value])
    }

    /// Lee una palabra de 16 bits con signo, byte alto primero.
    ///
    /// Son dos lecturas de un byte: la primera en `reg` y la segunda en `reg + 1`,
    /// salvo en FIFO_R_W, donde ambas lecturas consumen bytes consecutivos de la cola.
    fn read_word(&mut self, reg: u8) -> Result<i16, Self::Error> {
        let next = if reg == crate::register::registers::FIFO_R_W { reg } else { reg.wrapping_add(1) };
        let high = self.read_byte(reg)?;
        let low = self.read_byte(next)?;
        Ok(i16::from_be_bytes([high, low]))
    }

    /// Escribe una palabra de 16 bits, byte alto primero
    fn write_word(&mut self, reg: u8, value: i16) -> Result<(), Self::Error> {
        let [high, low] = value.to_be_bytes();
        self.write_byte(reg, high)?;
        self.write_byte(reg.wrapping_add(1), low)
    }
}

/// Implementación de Interface para I2C
pub struct I2cInterface<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C, E> I2cInterface<I2C>
where
    I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E>,
{
    /// Crea una nueva interfaz I2C
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self { i2c, addr }
    }

    /// Dirección de 7 bits del dispositivo
    pub fn address(&self) -> u8 {
        self.addr
    }

    /// Consume la interfaz y devuelve el dispositivo I2C subyacente
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> Interface for I2cInterface<I2C>
where
    I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E>,
    E: core::fmt::Debug,
{
    type Error = InterfaceError<E>;

    fn write_reg(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        let mut buffer = [0u8; 17];
        if data.len() > 16 || reg > 0x7F {
            return Err(InterfaceError::InvalidParameter);
        }
        buffer[0] = reg;
        buffer[1..data.len() + 1].copy_from_slice(data);

        self.i2c
            .write(self.addr, &buffer[0..data.len() + 1])
            .map_err(InterfaceError::I2cError)
    }

    fn read_reg(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        if reg > 0x7F {
            return Err(InterfaceError::InvalidParameter);
        }
        self.i2c
            .write_read(self.addr, &[reg], data)
            .map_err(InterfaceError::I2cError)
    }
}
