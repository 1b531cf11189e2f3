//! Imagen de los registros de configuración del MPU6050
//!
//! La imagen guarda el último valor escrito en cada registro de configuración.
//! Los bytes en bruto son la fuente de verdad: toda la configuración decodificada
//! ([`DecodedConfig`]) se obtiene con [`RegisterImage::decode`], que es una función
//! pura de esos bytes.

use core::time::Duration;

use bytemuck::{Pod, Zeroable};

use crate::device::Mpu6050Error;
use crate::register::{registers, CONFIG_WRITE_ORDER};
use crate::types::data_defs::IMAGE_SLOTS;
use crate::types::{self, bits, AccelFullScale, FilterSettings, GyroFullScale};

/// Valores de fábrica, en el orden en que se escriben
const FACTORY_DEFAULTS: [(u8, u8); 10] = [
    (registers::PWR_MGMT_1, 0x03),
    (registers::PWR_MGMT_2, 0x00),
    (registers::CONFIG, 0x00),
    (registers::SMPLRT_DIV, 0x4F),
    (registers::ACCEL_CONFIG, 0x00),
    (registers::GYRO_CONFIG, 0x00),
    (registers::USER_CTRL, 0x60),
    (registers::FIFO_EN, 0xF8),
    (registers::INT_PIN_CFG, 0x00),
    (registers::INT_ENABLE, 0x00),
];

/// Copia en memoria de los registros de configuración.
///
/// Cada entrada es un par `[registro, valor]`; el registro 0 marca una entrada libre.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct RegisterImage {
    regs: [[u8; 2]; IMAGE_SLOTS],
}

impl Default for RegisterImage {
    fn default() -> Self {
        Self::factory_default()
    }
}

impl RegisterImage {
    /// Imagen sin ningún registro configurado
    pub fn empty() -> Self {
        Self::zeroed()
    }

    /// Configuración de fábrica: filtro desactivado, divisor 79, ±2g, ±250°/s,
    /// FIFO con acelerómetro, temperatura y giroscopio.
    pub fn factory_default() -> Self {
        let mut image = Self::empty();
        for (slot, (reg, value)) in FACTORY_DEFAULTS.iter().enumerate() {
            image.regs[slot] = [*reg, *value];
        }
        image
    }

    fn position(&self, reg: u8) -> Option<usize> {
        self.regs.iter().position(|entry| entry[0] == reg)
    }

    /// Indica si el registro tiene un valor en la imagen
    pub fn contains(&self, reg: u8) -> bool {
        reg != 0 && self.position(reg).is_some()
    }

    /// Lee el valor guardado para un registro
    pub fn get(&self, reg: u8) -> Result<u8, Mpu6050Error> {
        if reg == 0 {
            return Err(Mpu6050Error::InvalidArgument);
        }
        self.position(reg)
            .map(|slot| self.regs[slot][1])
            .ok_or(Mpu6050Error::UnconfiguredRegister(reg))
    }

    /// Cambia el valor de un registro ya presente en la imagen
    pub fn set_field(&mut self, reg: u8, value: u8) -> Result<(), Mpu6050Error> {
        if reg == 0 {
            return Err(Mpu6050Error::InvalidArgument);
        }
        let slot = self
            .position(reg)
            .ok_or(Mpu6050Error::UnconfiguredRegister(reg))?;
        self.regs[slot][1] = value;
        Ok(())
    }

    /// Modifica un registro con una función de transformación
    pub fn update<F>(&mut self, reg: u8, f: F) -> Result<(), Mpu6050Error>
    where
        F: FnOnce(u8) -> u8,
    {
        let value = self.get(reg)?;
        self.set_field(reg, f(value))
    }

    /// Añade un registro a la imagen, o lo actualiza si ya existe
    pub fn insert(&mut self, reg: u8, value: u8) -> Result<(), Mpu6050Error> {
        if reg == 0 {
            return Err(Mpu6050Error::InvalidArgument);
        }
        if let Some(slot) = self.position(reg) {
            self.regs[slot][1] = value;
            return Ok(());
        }
        let free = self
            .position(0)
            .ok_or(Mpu6050Error::InvalidArgument)?;
        self.regs[free] = [reg, value];
        Ok(())
    }

    /// Pares (registro, valor) configurados, en el orden de escritura
    pub fn entries(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.regs
            .iter()
            .filter(|entry| entry[0] != 0)
            .map(|entry| (entry[0], entry[1]))
    }

    /// Número de registros configurados
    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodifica todos los registros.
    ///
    /// Falla con `UnsupportedFeature` si algún registro tiene activa una
    /// característica que el driver no soporta, y con `UnconfiguredRegister` si
    /// falta alguno de los registros de configuración.
    pub fn decode(&self) -> Result<DecodedConfig, Mpu6050Error> {
        for reg in CONFIG_WRITE_ORDER {
            self.get(reg)?;
        }

        let power = decode_power(self.get(registers::PWR_MGMT_1)?, self.get(registers::PWR_MGMT_2)?)?;
        let fifo = decode_fifo_enable(
            self.get(registers::FIFO_EN)?,
            self.get(registers::I2C_MST_CTRL).ok(),
        );

        let accel_config = self.get(registers::ACCEL_CONFIG)?;
        let accel_fs = AccelFullScale::from_register(accel_config);
        let accel_self_test = [
            accel_config & bits::XA_ST != 0,
            accel_config & bits::YA_ST != 0,
            accel_config & bits::ZA_ST != 0,
        ];

        let gyro_config = self.get(registers::GYRO_CONFIG)?;
        let gyro_fs = GyroFullScale::from_register(gyro_config);
        let gyro_self_test = [
            gyro_config & bits::XG_ST != 0,
            gyro_config & bits::YG_ST != 0,
            gyro_config & bits::ZG_ST != 0,
        ];

        let config = self.get(registers::CONFIG)?;
        if config & bits::EXT_SYNC_SET != 0 {
            return Err(Mpu6050Error::UnsupportedFeature("sincronización externa (EXT_SYNC_SET)"));
        }
        let filter = types::filter_settings(config & bits::DLPF_CFG)?;

        let timing = SampleTiming::new(filter.gyro_output_rate_hz, self.get(registers::SMPLRT_DIV)?);

        let user = decode_user_ctrl(self.get(registers::USER_CTRL)?)?;

        let pin_cfg = self.get(registers::INT_PIN_CFG)?;
        if pin_cfg & bits::FSYNC_INT_EN != 0 {
            return Err(Mpu6050Error::UnsupportedFeature("interrupción FSYNC"));
        }
        let int_enable = self.get(registers::INT_ENABLE)?;
        if int_enable & bits::I2C_MST_INT_EN != 0 {
            return Err(Mpu6050Error::UnsupportedFeature("interrupción del maestro I2C"));
        }
        let interrupts = InterruptConfig {
            fifo_overflow: int_enable & bits::FIFO_OFLOW_EN != 0,
            data_ready: int_enable & bits::DATA_RDY_EN != 0,
        };

        Ok(DecodedConfig {
            power,
            fifo,
            accel_fs,
            accel_self_test,
            gyro_fs,
            gyro_self_test,
            filter,
            timing,
            user,
            interrupts,
        })
    }
}

/// Estado de energía (PWR_MGMT_1 y PWR_MGMT_2)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PowerState {
    pub sleep: bool,
    pub cycle: bool,
    pub temp_disabled: bool,
    pub clock_source: u8,
    /// Standby de acelerómetro [x, y, z]
    pub standby_accel: [bool; 3],
    /// Standby de giroscopio [x, y, z]
    pub standby_gyro: [bool; 3],
    pub wake_frequency_hz: f64,
}

fn decode_power(pwr_mgmt_1: u8, pwr_mgmt_2: u8) -> Result<PowerState, Mpu6050Error> {
    if pwr_mgmt_1 & bits::DEVICE_RESET != 0 {
        return Err(Mpu6050Error::UnsupportedFeature("reset del dispositivo sin completar"));
    }
    let cycle = pwr_mgmt_1 & bits::CYCLE != 0;
    Ok(PowerState {
        sleep: pwr_mgmt_1 & bits::SLEEP != 0,
        cycle,
        temp_disabled: pwr_mgmt_1 & bits::TEMP_DIS != 0,
        clock_source: pwr_mgmt_1 & bits::CLKSEL,
        standby_accel: [
            pwr_mgmt_2 & bits::STBY_XA != 0,
            pwr_mgmt_2 & bits::STBY_YA != 0,
            pwr_mgmt_2 & bits::STBY_ZA != 0,
        ],
        standby_gyro: [
            pwr_mgmt_2 & bits::STBY_XG != 0,
            pwr_mgmt_2 & bits::STBY_YG != 0,
            pwr_mgmt_2 & bits::STBY_ZG != 0,
        ],
        wake_frequency_hz: types::wake_frequency_hz(cycle, (pwr_mgmt_2 & bits::LP_WAKE_CTRL) >> 6),
    })
}

/// Canales que el dispositivo vuelca en la FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FifoEnable {
    pub temp: bool,
    /// Ejes del giroscopio [x, y, z]
    pub gyro: [bool; 3],
    /// Los tres ejes del acelerómetro van siempre juntos
    pub accel: bool,
    /// Esclavos del bus auxiliar 0..4. El esclavo 4 no tiene bit de FIFO.
    pub aux: [bool; 5],
}

impl FifoEnable {
    /// Palabras de 16 bits por muestra
    pub fn words_per_sample(&self) -> u16 {
        let singles = [self.temp, self.gyro[0], self.gyro[1], self.gyro[2]]
            .iter()
            .chain(self.aux.iter())
            .filter(|enabled| **enabled)
            .count() as u16;
        singles + if self.accel { 3 } else { 0 }
    }

    pub fn all_gyro(&self) -> bool {
        self.gyro.iter().all(|axis| *axis)
    }
}

fn decode_fifo_enable(fifo_en: u8, i2c_mst_ctrl: Option<u8>) -> FifoEnable {
    FifoEnable {
        temp: fifo_en & bits::TEMP_FIFO_EN != 0,
        gyro: [
            fifo_en & bits::XG_FIFO_EN != 0,
            fifo_en & bits::YG_FIFO_EN != 0,
            fifo_en & bits::ZG_FIFO_EN != 0,
        ],
        accel: fifo_en & bits::ACCEL_FIFO_EN != 0,
        aux: [
            fifo_en & bits::SLV0_FIFO_EN != 0,
            fifo_en & bits::SLV1_FIFO_EN != 0,
            fifo_en & bits::SLV2_FIFO_EN != 0,
            i2c_mst_ctrl.map_or(false, |value| value & bits::SLV3_FIFO_EN != 0),
            false,
        ],
    }
}

/// Temporización del muestreo derivada de SMPLRT_DIV
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampleTiming {
    pub divider: u8,
    pub rate_hz: f64,
    pub period_s: f64,
    /// Espera entre muestras usada al sondear la FIFO
    pub wait: Duration,
}

impl SampleTiming {
    /// rate = gyro_output_rate / (1 + divider)
    pub fn new(gyro_output_rate_hz: u32, divider: u8) -> Self {
        let rate_hz = gyro_output_rate_hz as f64 / (1.0 + divider as f64);
        let period_s = 1.0 / rate_hz;
        let secs = period_s.trunc();
        let nanos = ((period_s - secs) * 1e9).round().min(999_999_999.0) as u32;
        Self {
            divider,
            rate_hz,
            period_s,
            wait: Duration::new(secs as u64, nanos),
        }
    }
}

/// Flags de USER_CTRL que el driver admite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserControl {
    pub fifo_enabled: bool,
    pub i2c_master_enabled: bool,
}

fn decode_user_ctrl(value: u8) -> Result<UserControl, Mpu6050Error> {
    // Los bits de reset se autolimpian en el dispositivo, nunca deben quedar en la imagen
    if value & (bits::FIFO_RESET | bits::I2C_MST_RESET | bits::SIG_COND_RESET) != 0 {
        return Err(Mpu6050Error::UnsupportedFeature("bit de reset en USER_CTRL"));
    }
    if value & bits::I2C_IF_DIS != 0 {
        return Err(Mpu6050Error::UnsupportedFeature("interfaz I2C deshabilitada (I2C_IF_DIS)"));
    }
    Ok(UserControl {
        fifo_enabled: value & bits::FIFO_EN != 0,
        i2c_master_enabled: value & bits::I2C_MST_EN != 0,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterruptConfig {
    pub fifo_overflow: bool,
    pub data_ready: bool,
}

/// Configuración decodificada a partir de una [`RegisterImage`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DecodedConfig {
    pub power: PowerState,
    pub fifo: FifoEnable,
    pub accel_fs: AccelFullScale,
    /// Estímulo de auto-test del acelerómetro [x, y, z] (sólo informativo)
    pub accel_self_test: [bool; 3],
    pub gyro_fs: GyroFullScale,
    /// Estímulo de auto-test del giroscopio [x, y, z] (sólo informativo)
    pub gyro_self_test: [bool; 3],
    pub filter: FilterSettings,
    pub timing: SampleTiming,
    pub user: UserControl,
    pub interrupts: InterruptConfig,
}
