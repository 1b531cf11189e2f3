//! Implementación para manejar el FIFO del MPU6050
//!
//! Lectura por lotes: se sondea el contador de la FIFO hasta que hay una muestra
//! completa, se leen las palabras en el orden de los slots y se convierten a
//! unidades físicas con la escala de cada canal.
//!
//! La espera por defecto no tiene límite. Quien necesite una latencia acotada
//! debe usar [`Mpu6050::read_fifo_sample_before`].

use core::time::Duration;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};

use crate::base::{SystemTimeSource, TimeSource};
use crate::channels::ChannelKind;
use crate::device::{Mpu6050, Mpu6050Error};
use crate::interface::Interface;
use crate::register::registers;
use crate::storage::ParameterStore;
use crate::types::bits;
use crate::types::data_defs::{FIFO_MAX_BYTES, TEMP_OFFSET_C};

impl<I, D, S> Mpu6050<I, D, S>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
{
    /// Bytes pendientes en la FIFO
    pub fn fifo_count(&mut self) -> Result<u16, Mpu6050Error> {
        Ok(self.read_word(registers::FIFO_COUNT_H)? as u16)
    }

    /// Descarta todo el contenido de la FIFO y pone a cero el contador de muestras
    pub fn flush_fifo(&mut self) -> Result<(), Mpu6050Error> {
        let count = self.fifo_count()?;
        for _ in 0..count {
            self.read_reg(registers::FIFO_R_W)?;
        }
        self.samples = 0;
        Ok(())
    }

    /// Espera a que haya una muestra completa en la FIFO y la decodifica.
    ///
    /// No retorna hasta que llegan los datos.
    pub fn read_fifo_sample(&mut self) -> Result<(), Mpu6050Error> {
        self.poll_and_decode(None)
    }

    /// Igual que [`read_fifo_sample`](Self::read_fifo_sample) pero con un plazo
    /// (en microsegundos del reloj `clock`); falla con `Timeout` al alcanzarlo.
    pub fn read_fifo_sample_before<T: TimeSource>(
        &mut self,
        clock: &T,
        deadline_us: u64,
    ) -> Result<(), Mpu6050Error> {
        self.poll_and_decode(Some((clock as &dyn TimeSource, deadline_us)))
    }

    /// Lectura con plazo relativo medido con el reloj del sistema
    pub fn read_fifo_sample_timeout(&mut self, timeout: Duration) -> Result<(), Mpu6050Error> {
        let clock = SystemTimeSource::new();
        let deadline = clock.get_timestamp_us() + timeout.as_micros() as u64;
        self.read_fifo_sample_before(&clock, deadline)
    }

    /// Lee una muestra y corrige la orientación del acelerómetro
    pub fn read_data(&mut self) -> Result<(), Mpu6050Error> {
        self.read_fifo_sample()?;
        self.fix_axis_orientation();
        Ok(())
    }

    /// Invierte los tres ejes del acelerómetro para pasar al sistema de ejes del cuerpo.
    /// El giroscopio ya viene bien orientado.
    pub fn fix_axis_orientation(&mut self) {
        if let Some(slots) = self.channels.accel_slots() {
            for slot in slots {
                self.buffer.value[slot.get()][0] = -self.buffer.value[slot.get()][0];
            }
        }
    }

    fn poll_and_decode(&mut self, deadline: Option<(&dyn TimeSource, u64)>) -> Result<(), Mpu6050Error> {
        let words = self.buffer.words_per_sample();
        if words == 0 {
            return Ok(());
        }
        let frame_bytes = 2 * words;

        loop {
            let count = self.fifo_count()?;
            if count > FIFO_MAX_BYTES {
                log::warn!("Desbordamiento de la FIFO ({} bytes), se descarta su contenido", count);
                self.flush_fifo()?;
            } else if count >= frame_bytes {
                break;
            }
            if let Some((clock, deadline_us)) = deadline {
                if clock.get_timestamp_us() >= deadline_us {
                    return Err(Mpu6050Error::Timeout);
                }
            }
            self.wait_sample_period();
        }

        self.decode_frame(words as usize)
    }

    fn wait_sample_period(&mut self) {
        let us = self.config.timing.wait.as_micros().min(u32::MAX as u128) as u32;
        self.delay.delay_us(us);
    }

    fn decode_frame(&mut self, words: usize) -> Result<(), Mpu6050Error> {
        for slot in 1..=words {
            let raw = self.read_word(registers::FIFO_R_W)?;
            self.buffer.store(slot, raw);
        }

        if let Some(slot) = self.channels.slot(ChannelKind::Temperature) {
            self.buffer.value[slot.get()][0] += TEMP_OFFSET_C;
        }

        if let Some(slots) = self.channels.accel_slots() {
            let mut sum = 0.0;
            for (axis, slot) in slots.iter().enumerate() {
                let i = slot.get();
                self.buffer.value[i][0] -= self.calibration.accel_bias[axis];
                self.buffer.squared[i] = self.buffer.value[i][0] * self.buffer.value[i][0];
                sum += self.buffer.squared[i];
            }
            self.buffer.accel_magnitude = sum.sqrt();
        }

        if let Some(slots) = self.channels.gyro_slots() {
            let mut sum = 0.0;
            for (axis, slot) in slots.iter().enumerate() {
                let i = slot.get();
                self.buffer.value[i][0] -= self.calibration.gyro_bias[axis];
                self.buffer.squared[i] = self.buffer.value[i][0] * self.buffer.value[i][0];
                sum += self.buffer.squared[i];
            }
            self.buffer.gyro_magnitude = sum.sqrt();
        }

        self.samples += 1;
        for slot in 1..=words {
            self.buffer.update_statistics(slot, self.samples);
        }
        Ok(())
    }

    /// Activa la FIFO (USER_CTRL.FIFO_EN)
    pub fn enable_fifo(&mut self) -> Result<(), Mpu6050Error> {
        self.image.update(registers::USER_CTRL, |value| value | bits::FIFO_EN)?;
        self.apply_image()?;
        self.flush_fifo()
    }

    /// Desactiva la FIFO (USER_CTRL.FIFO_EN)
    pub fn disable_fifo(&mut self) -> Result<(), Mpu6050Error> {
        self.image.update(registers::USER_CTRL, |value| value & !bits::FIFO_EN)?;
        self.apply_image()
    }

    pub fn set_accel_fifo(&mut self, enabled: bool) -> Result<(), Mpu6050Error> {
        self.set_fifo_channels(bits::ACCEL_FIFO_EN, enabled)
    }

    /// Los tres ejes del giroscopio
    pub fn set_gyro_fifo(&mut self, enabled: bool) -> Result<(), Mpu6050Error> {
        self.set_fifo_channels(bits::GYRO_FIFO_EN, enabled)
    }

    pub fn set_temp_fifo(&mut self, enabled: bool) -> Result<(), Mpu6050Error> {
        self.set_fifo_channels(bits::TEMP_FIFO_EN, enabled)
    }

    /// Pulso de reset de la FIFO. El bit se autolimpia y no se guarda en la imagen.
    pub fn reset_fifo(&mut self) -> Result<(), Mpu6050Error> {
        self.strobe_user_ctrl(bits::FIFO_RESET)?;
        self.samples = 0;
        Ok(())
    }

    /// Pulso de reset de las rutas de señal de los sensores
    pub fn reset_signal_paths(&mut self) -> Result<(), Mpu6050Error> {
        self.strobe_user_ctrl(bits::SIG_COND_RESET)
    }

    /// Pulso de reset del maestro I2C auxiliar
    pub fn reset_i2c_master(&mut self) -> Result<(), Mpu6050Error> {
        self.strobe_user_ctrl(bits::I2C_MST_RESET)
    }

    fn strobe_user_ctrl(&mut self, bit: u8) -> Result<(), Mpu6050Error> {
        let value = self.image.get(registers::USER_CTRL)?;
        self.write_reg(registers::USER_CTRL, value | bit)
    }
}
