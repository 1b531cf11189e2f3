use core::fmt;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};

use crate::calibration::CalibrationRecord;
use crate::channels::{ChannelKind, ChannelReading, ChannelTable, SampleBuffer};
use crate::config::{DecodedConfig, RegisterImage};
use crate::conversion::{accel_raw_to_g, gyro_raw_to_dps, temp_raw_to_celsius};
use crate::interface::Interface;
use crate::register::registers;
use crate::storage::{FileStore, ParameterStore};
use crate::types::data_defs::{DEFAULT_CALIBRATION_SAMPLES, RESET_WAIT_MS};
use crate::types::{self, bits, AccelFullScale, ClockSource, GyroFullScale, InitMode};

/// Driver del MPU6050.
///
/// Es propietario de la imagen de registros, la tabla de canales, el buffer de
/// muestras y el registro de calibración. Todas las operaciones toman `&mut self`:
/// el dispositivo debe tener un único dueño (o acceso serializado desde fuera).
pub struct Mpu6050<I, D, S = FileStore> {
    pub(crate) interface: I,
    pub(crate) delay: D,
    pub(crate) store: S,
    pub(crate) image: RegisterImage,
    pub(crate) config: DecodedConfig,
    pub(crate) channels: ChannelTable,
    pub(crate) buffer: SampleBuffer,
    pub(crate) calibration: CalibrationRecord,
    pub(crate) samples: u64,
    pub(crate) product_id: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mpu6050Error {
    /// Parámetro fuera de rango (ruta, escala, frecuencia, fuente de reloj...)
    InvalidArgument,
    /// Consulta de un registro que no está en la imagen
    UnconfiguredRegister(u8),
    /// El valor releído no coincide con el escrito
    ValidationMismatch { register: u8, written: u8, read: u8 },
    /// El dispositivo tiene activa una característica que el driver no soporta
    UnsupportedFeature(&'static str),
    /// Error del bus
    BusError,
    /// No se pudo abrir el bus
    BindFailure,
    /// Error de E/S al guardar o cargar parámetros o escribir informes
    Storage(std::io::ErrorKind),
    /// El canal necesario no está activo en la FIFO
    ChannelUnavailable(ChannelKind),
    /// Se alcanzó el plazo esperando datos en la FIFO
    Timeout,
}

impl Mpu6050Error {
    pub fn from_error<E: fmt::Debug>(error: E) -> Self {
        log::debug!("Error de bus: {:?}", error);
        Mpu6050Error::BusError
    }
}

impl fmt::Display for Mpu6050Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mpu6050Error::InvalidArgument => write!(f, "argumento inválido"),
            Mpu6050Error::UnconfiguredRegister(reg) => {
                write!(f, "registro {:#04x} no configurado", reg)
            }
            Mpu6050Error::ValidationMismatch { register, written, read } => write!(
                f,
                "validación fallida en el registro {:#04x}: escrito {:#04x}, leído {:#04x}",
                register, written, read
            ),
            Mpu6050Error::UnsupportedFeature(what) => write!(f, "característica no soportada: {}", what),
            Mpu6050Error::BusError => write!(f, "error de bus"),
            Mpu6050Error::BindFailure => write!(f, "no se pudo abrir el bus"),
            Mpu6050Error::Storage(kind) => write!(f, "error de E/S: {:?}", kind),
            Mpu6050Error::ChannelUnavailable(kind) => {
                write!(f, "canal {} no activo", kind.name())
            }
            Mpu6050Error::Timeout => write!(f, "tiempo de espera agotado"),
        }
    }
}

impl std::error::Error for Mpu6050Error {}

impl From<std::io::Error> for Mpu6050Error {
    fn from(error: std::io::Error) -> Self {
        Mpu6050Error::Storage(error.kind())
    }
}

/// Lectura directa de los registros de datos (sin pasar por la FIFO)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionSample {
    /// Aceleración en g [x, y, z]
    pub accel: [f64; 3],
    /// Temperatura en °C
    pub temperature: f64,
    /// Velocidad angular en °/s [x, y, z]
    pub gyro: [f64; 3],
}

/// Constructor del driver.
///
/// `build` devuelve un dispositivo completamente inicializado o el primer error;
/// en caso de error todo lo adquirido se libera al salir de ámbito.
pub struct Mpu6050Builder<I, D, S> {
    interface: I,
    delay: D,
    store: S,
    mode: InitMode,
    calibration_samples: Option<u32>,
}

impl<I, D> Mpu6050<I, D, FileStore> {
    pub fn builder(interface: I, delay: D) -> Mpu6050Builder<I, D, FileStore> {
        Mpu6050Builder {
            interface,
            delay,
            store: FileStore::default(),
            mode: InitMode::Reset,
            calibration_samples: None,
        }
    }
}

impl<I, D, S> Mpu6050Builder<I, D, S> {
    /// Almacén de parámetros (por defecto `mpu6050_cfg.bin`)
    pub fn store<S2>(self, store: S2) -> Mpu6050Builder<I, D, S2> {
        Mpu6050Builder {
            interface: self.interface,
            delay: self.delay,
            store,
            mode: self.mode,
            calibration_samples: self.calibration_samples,
        }
    }

    pub fn mode(mut self, mode: InitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Muestras por pasada de calibración
    pub fn calibration_samples(mut self, samples: u32) -> Self {
        self.calibration_samples = Some(samples);
        self
    }
}

impl<I, D, S> Mpu6050Builder<I, D, S>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
{
    /// Despierta el dispositivo y lo deja en el modo pedido
    pub fn build(self) -> Result<Mpu6050<I, D, S>, Mpu6050Error> {
        let mut device = Mpu6050 {
            interface: self.interface,
            delay: self.delay,
            store: self.store,
            image: RegisterImage::factory_default(),
            config: DecodedConfig::default(),
            channels: ChannelTable::new(),
            buffer: SampleBuffer::new(),
            calibration: CalibrationRecord::new(),
            samples: 0,
            product_id: 0,
        };

        device.wake()?;
        device.modify_reg(registers::PWR_MGMT_1, |value| {
            (value & !bits::CLKSEL) | ClockSource::PllGyroZ as u8
        })?;
        device.reset_data();

        match self.mode {
            InitMode::Reset => {
                device.image = RegisterImage::factory_default();
                device.calibration = CalibrationRecord::new();
                device.calibration.samples = self.calibration_samples.unwrap_or(DEFAULT_CALIBRATION_SAMPLES);
                device.apply_image()?;
            }
            InitMode::Restore => {
                let (image, record) = device.store.load().map_err(|e| {
                    log::error!("No se pudieron cargar los parámetros guardados: {}", e);
                    Mpu6050Error::Storage(e.kind())
                })?;
                device.image = image;
                device.calibration = record;
                if let Some(samples) = self.calibration_samples {
                    device.calibration.samples = samples;
                }
                device.config = device.image.decode()?;
            }
        }

        device.channels.rebind(&device.config, &mut device.buffer);
        device.product_id = device.read_reg(registers::PROD_ID)?;
        device.flush_fifo()?;

        log::info!(
            "MPU6050 inicializado ({:?}): PROD_ID {:#04x}, {} Hz, {} palabras por muestra",
            self.mode,
            device.product_id,
            device.config.timing.rate_hz,
            device.buffer.words_per_sample()
        );
        Ok(device)
    }
}

impl<I, D, S> Mpu6050<I, D, S> {
    /// Imagen de registros actual
    pub fn image(&self) -> &RegisterImage {
        &self.image
    }

    /// Configuración decodificada de la última imagen aplicada
    pub fn config(&self) -> &DecodedConfig {
        &self.config
    }

    pub fn channels(&self) -> &ChannelTable {
        &self.channels
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn calibration(&self) -> &CalibrationRecord {
        &self.calibration
    }

    /// Muestras decodificadas desde el último vaciado de la FIFO
    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    pub fn product_id(&self) -> u8 {
        self.product_id
    }

    pub fn sample_rate_hz(&self) -> f64 {
        self.config.timing.rate_hz
    }

    pub fn wake_frequency_hz(&self) -> f64 {
        self.config.power.wake_frequency_hz
    }

    /// Estado completo de un canal, si está activo
    pub fn channel(&self, kind: ChannelKind) -> Option<ChannelReading> {
        let slot = self.channels.slot(kind)?;
        let i = slot.get();
        Some(ChannelReading {
            kind,
            slot,
            raw: self.buffer.raw(slot),
            value: self.buffer.value(slot),
            previous: self.buffer.previous(slot),
            squared: self.buffer.squared(slot),
            mean: self.buffer.mean(slot),
            variance: self.buffer.variance(slot),
            offset: self.calibration.offset[i],
            gain: self.calibration.gain[i],
            drift: self.calibration.drift[i],
        })
    }

    /// Valor actual de un canal
    pub fn value(&self, kind: ChannelKind) -> Option<f64> {
        self.channels.slot(kind).map(|slot| self.buffer.value(slot))
    }

    /// Aceleración en g [x, y, z]
    pub fn accel(&self) -> Option<[f64; 3]> {
        self.channels
            .accel_slots()
            .map(|slots| slots.map(|slot| self.buffer.value(slot)))
    }

    /// Velocidad angular en °/s [x, y, z]
    pub fn gyro(&self) -> Option<[f64; 3]> {
        self.channels
            .gyro_slots()
            .map(|slots| slots.map(|slot| self.buffer.value(slot)))
    }

    /// Temperatura en °C
    pub fn temperature(&self) -> Option<f64> {
        self.value(ChannelKind::Temperature)
    }

    /// Valor sin escalar de un esclavo auxiliar
    pub fn aux(&self, n: u8) -> Option<f64> {
        self.value(ChannelKind::Aux(n))
    }

    pub fn accel_magnitude(&self) -> Option<f64> {
        self.channels.accel_slots().map(|_| self.buffer.accel_magnitude())
    }

    pub fn gyro_magnitude(&self) -> Option<f64> {
        self.channels.gyro_slots().map(|_| self.buffer.gyro_magnitude())
    }

    /// Consume el driver y devuelve sus recursos
    pub fn release(self) -> (I, D, S) {
        (self.interface, self.delay, self.store)
    }

    pub(crate) fn reset_data(&mut self) {
        self.samples = 0;
        self.channels.unbind(&mut self.buffer);
    }
}

impl<I, D, S> Mpu6050<I, D, S>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
{
    /// Lee un registro del dispositivo
    pub fn read_reg(&mut self, reg: u8) -> Result<u8, Mpu6050Error> {
        self.interface.read_byte(reg).map_err(Mpu6050Error::from_error)
    }

    /// Escribe un registro del dispositivo (no toca la imagen)
    pub fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Mpu6050Error> {
        self.interface.write_byte(reg, value).map_err(Mpu6050Error::from_error)
    }

    /// Modifica un registro leyendo su valor actual
    pub fn modify_reg<F>(&mut self, reg: u8, f: F) -> Result<(), Mpu6050Error>
    where
        F: FnOnce(u8) -> u8,
    {
        let value = self.read_reg(reg)?;
        self.write_reg(reg, f(value))
    }

    /// Lee una palabra de 16 bits con signo (byte alto primero)
    pub fn read_word(&mut self, reg: u8) -> Result<i16, Mpu6050Error> {
        self.interface.read_word(reg).map_err(Mpu6050Error::from_error)
    }

    pub fn write_word(&mut self, reg: u8, value: i16) -> Result<(), Mpu6050Error> {
        self.interface.write_word(reg, value).map_err(Mpu6050Error::from_error)
    }

    /// Saca al dispositivo de reposo: limpia reset, sleep y ciclo, y todos los standby
    pub fn wake(&mut self) -> Result<(), Mpu6050Error> {
        self.modify_reg(registers::PWR_MGMT_1, |value| {
            value & !(bits::DEVICE_RESET | bits::SLEEP | bits::CYCLE)
        })?;
        self.write_reg(registers::PWR_MGMT_2, 0x00)
    }

    /// Reset completo del dispositivo y reaplicación de la imagen actual
    pub fn reset(&mut self) -> Result<(), Mpu6050Error> {
        log::debug!("Reset del dispositivo");
        self.write_reg(registers::PWR_MGMT_1, bits::DEVICE_RESET)?;
        self.delay.delay_ms(RESET_WAIT_MS);
        self.wake()?;
        self.apply_image()
    }

    /// Sustituye la imagen de registros y la aplica
    pub fn set_image(&mut self, image: RegisterImage) -> Result<(), Mpu6050Error> {
        self.image = image;
        self.apply_image()
    }

    /// Vuelve a la configuración de fábrica
    pub fn reset_to_defaults(&mut self) -> Result<(), Mpu6050Error> {
        self.set_image(RegisterImage::factory_default())?;
        self.flush_fifo()
    }

    /// Escribe la imagen en el dispositivo, la valida releyendo cada registro,
    /// la decodifica, reconstruye la tabla de canales y guarda los parámetros.
    ///
    /// Si falla, la tabla de canales queda vacía y la imagen debe considerarse inválida.
    /// En ambos casos el contador de muestras vuelve a cero, igual que las
    /// estadísticas de los slots.
    pub fn apply_image(&mut self) -> Result<(), Mpu6050Error> {
        self.samples = 0;
        match self.write_and_validate().and_then(|_| self.image.decode()) {
            Ok(config) => {
                self.config = config;
                self.channels.rebind(&self.config, &mut self.buffer);
                self.persist();
                Ok(())
            }
            Err(e) => {
                log::warn!("No se pudo aplicar la configuración: {}", e);
                self.channels.unbind(&mut self.buffer);
                Err(e)
            }
        }
    }

    fn write_and_validate(&mut self) -> Result<(), Mpu6050Error> {
        let image = self.image;
        for (reg, value) in image.entries() {
            self.write_reg(reg, value)?;
        }
        for (reg, written) in image.entries() {
            let read = self.read_reg(reg)?;
            if read != written {
                return Err(Mpu6050Error::ValidationMismatch { register: reg, written, read });
            }
        }
        Ok(())
    }

    /// Guarda imagen y calibración; un fallo sólo se registra
    pub(crate) fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.image, &self.calibration) {
            log::warn!("No se pudieron guardar los parámetros: {}", e);
        }
    }

    /// Guarda imagen y calibración devolviendo el error de E/S
    pub fn save_parameters(&mut self) -> Result<(), Mpu6050Error> {
        self.store
            .save(&self.image, &self.calibration)
            .map_err(Mpu6050Error::from)
    }

    fn update_image<F>(&mut self, reg: u8, f: F) -> Result<(), Mpu6050Error>
    where
        F: FnOnce(u8) -> u8,
    {
        self.image.update(reg, f)?;
        self.apply_image()
    }

    /// Configura el filtro paso bajo (0..=6).
    ///
    /// Si cambia la frecuencia de salida del giroscopio se restablece la
    /// frecuencia de muestreo anterior.
    pub fn set_dlpf(&mut self, dlpf: u8) -> Result<(), Mpu6050Error> {
        types::filter_settings(dlpf).map_err(|_| Mpu6050Error::InvalidArgument)?;
        if self.config.filter.dlpf == dlpf {
            return Ok(());
        }
        let old_rate = self.config.timing.rate_hz;
        let old_output_rate = self.config.filter.gyro_output_rate_hz;

        self.update_image(registers::CONFIG, |value| (value & !bits::DLPF_CFG) | dlpf)?;

        if self.config.filter.gyro_output_rate_hz != old_output_rate {
            self.program_sample_rate(old_rate)?;
        }
        Ok(())
    }

    /// Configura la frecuencia de muestreo: 500, 250, 200, 100 o 50 Hz
    pub fn set_sample_rate(&mut self, rate_hz: u32) -> Result<(), Mpu6050Error> {
        if !types::SUPPORTED_SAMPLE_RATES.contains(&rate_hz) {
            return Err(Mpu6050Error::InvalidArgument);
        }
        if (self.config.timing.rate_hz - rate_hz as f64).abs() < f64::EPSILON {
            return Ok(());
        }
        self.program_sample_rate(rate_hz as f64)
    }

    fn program_sample_rate(&mut self, rate_hz: f64) -> Result<(), Mpu6050Error> {
        let base = self.config.filter.gyro_output_rate_hz as f64;
        let divider = ((base / rate_hz).round() - 1.0).clamp(0.0, 255.0) as u8;
        self.update_image(registers::SMPLRT_DIV, |_| divider)
    }

    /// Escala del acelerómetro en g: 2, 4, 8 o 16
    pub fn set_accel_range(&mut self, g: u32) -> Result<(), Mpu6050Error> {
        let fs = AccelFullScale::from_g(g)?;
        self.update_image(registers::ACCEL_CONFIG, |value| {
            (value & !bits::AFS_SEL) | fs.register_bits()
        })?;
        self.flush_fifo()
    }

    /// Escala del giroscopio en °/s: 250, 500, 1000 o 2000
    pub fn set_gyro_range(&mut self, dps: u32) -> Result<(), Mpu6050Error> {
        let fs = GyroFullScale::from_dps(dps)?;
        self.update_image(registers::GYRO_CONFIG, |value| {
            (value & !bits::FS_SEL) | fs.register_bits()
        })?;
        self.flush_fifo()
    }

    /// Fuente de reloj (0..=3)
    pub fn set_clock_source(&mut self, source: u8) -> Result<(), Mpu6050Error> {
        let source = ClockSource::try_from(source)?;
        self.update_image(registers::PWR_MGMT_1, |value| {
            (value & !bits::CLKSEL) | source as u8
        })
    }

    /// Activa o desactiva grupos de canales en FIFO_EN y vacía la FIFO
    pub fn set_fifo_channels(&mut self, mask: u8, enabled: bool) -> Result<(), Mpu6050Error> {
        self.update_image(registers::FIFO_EN, |value| {
            if enabled {
                value | mask
            } else {
                value & !mask
            }
        })?;
        self.flush_fifo()
    }

    /// Lee acelerómetro, temperatura y giroscopio directamente de los registros de datos
    pub fn read_motion_registers(&mut self) -> Result<MotionSample, Mpu6050Error> {
        let mut raw = [0i16; 7];
        for (i, value) in raw.iter_mut().enumerate() {
            *value = self.read_word(registers::ACCEL_XOUT_H + 2 * i as u8)?;
        }
        Ok(MotionSample {
            accel: accel_raw_to_g([raw[0], raw[1], raw[2]], self.config.accel_fs),
            temperature: temp_raw_to_celsius(raw[3]),
            gyro: gyro_raw_to_dps([raw[4], raw[5], raw[6]], self.config.gyro_fs),
        })
    }
}
