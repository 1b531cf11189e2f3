//! Módulo para realizar el auto-test y la calibración del MPU6050
//!
//! Ambos procedimientos siguen el mismo esquema: guardar la imagen de registros,
//! reconfigurar, acumular N muestras, calcular el resultado y restaurar la
//! configuración original (también si algo falla por el camino).
//!
//! El auto-test requiere el dispositivo apoyado en una superficie plana y la
//! calibración lo requiere inmóvil y nivelado. El software no puede comprobarlo.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};

use crate::calibration::CalibrationRecord;
use crate::channels::ChannelKind;
use crate::config::RegisterImage;
use crate::device::{Mpu6050, Mpu6050Error};
use crate::interface::Interface;
use crate::register::{registers, OFFSET_REGISTERS};
use crate::storage::ParameterStore;
use crate::types::bits;
use crate::types::data_defs::{SELF_TEST_MAX_SHIFT_PCT, SELF_TEST_SAMPLES, SELF_TEST_SETTLE_MS};
use crate::types::{AccelFullScale, GyroFullScale};

const AXES: [&str; 3] = ["X", "Y", "Z"];

/// Resultado del auto-test de un eje
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisResult {
    /// Respuesta al estímulo en LSB de la escala de test
    pub response: f64,
    /// Trimado de fábrica en LSB
    pub factory_trim: f64,
    /// Desviación respecto al trimado, en %
    pub shift_pct: f64,
    pub pass: bool,
}

impl AxisResult {
    fn new(response: f64, factory_trim: f64) -> Self {
        let shift_pct = shift_percent(response, factory_trim);
        Self {
            response,
            factory_trim,
            shift_pct,
            pass: passes(shift_pct),
        }
    }
}

/// Resultados del auto-test
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelfTestReport {
    pub accel: [AxisResult; 3],
    pub gyro: [AxisResult; 3],
}

impl SelfTestReport {
    pub fn accel_passed(&self) -> bool {
        self.accel.iter().all(|axis| axis.pass)
    }

    pub fn gyro_passed(&self) -> bool {
        self.gyro.iter().all(|axis| axis.pass)
    }

    pub fn passed(&self) -> bool {
        self.accel_passed() && self.gyro_passed()
    }

    /// Escribe las seis líneas de resultado
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (axis, result) in self.accel.iter().enumerate() {
            write_line(out, &format!("{}a", AXES[axis]), result)?;
        }
        for (axis, result) in self.gyro.iter().enumerate() {
            write_line(out, &format!("{}g", AXES[axis]), result)?;
        }
        Ok(())
    }
}

fn write_line<W: Write>(out: &mut W, name: &str, result: &AxisResult) -> io::Result<()> {
    writeln!(
        out,
        "Self-test results: {} = {:.6}% shift from factory trim ({})",
        name,
        result.shift_pct,
        if result.pass { "PASS" } else { "FAIL" }
    )
}

/// Trimado de fábrica del acelerómetro (LSB a ±8g) a partir del código de 5 bits
pub fn accel_factory_trim(code: u8) -> f64 {
    if code == 0 {
        return 0.0;
    }
    4096.0 * 0.34 * (0.92f64 / 0.34).powf((code as f64 - 1.0) / 14.0)
}

/// Trimado de fábrica del giroscopio (LSB a ±250°/s) a partir del código de 5 bits.
/// El eje Y tiene signo negativo.
pub fn gyro_factory_trim(code: u8, negative: bool) -> f64 {
    if code == 0 {
        return 0.0;
    }
    let trim = 25.0 * 131.0 * 1046f64.powi(code as i32 - 1);
    if negative {
        -trim
    } else {
        trim
    }
}

/// Desviación en % de la respuesta respecto al trimado.
///
/// La respuesta es un valor absoluto, así que se compara con la magnitud del trimado.
pub fn shift_percent(response: f64, factory_trim: f64) -> f64 {
    let trim = factory_trim.abs();
    if trim == 0.0 {
        return f64::INFINITY;
    }
    100.0 * (response - trim) / trim
}

/// Un eje pasa si la desviación está estrictamente por debajo del 14%
pub fn passes(shift_pct: f64) -> bool {
    shift_pct.abs() < SELF_TEST_MAX_SHIFT_PCT
}

/// Códigos de auto-test [x, y, z] del acelerómetro a partir de SELF_TEST_X/Y/Z/A
pub fn accel_test_codes(st: [u8; 4]) -> [u8; 3] {
    [
        ((st[0] & bits::XA_TEST_42) >> 3) | ((st[3] & bits::XA_TEST_10) >> 4),
        ((st[1] & bits::YA_TEST_42) >> 3) | ((st[3] & bits::YA_TEST_10) >> 2),
        ((st[2] & bits::ZA_TEST_42) >> 3) | (st[3] & bits::ZA_TEST_10),
    ]
}

/// Códigos de auto-test [x, y, z] del giroscopio
pub fn gyro_test_codes(st: [u8; 4]) -> [u8; 3] {
    [st[0] & bits::XG_TEST, st[1] & bits::YG_TEST, st[2] & bits::ZG_TEST]
}

/// Sumas acumuladas durante una pasada
#[derive(Debug, Clone, Copy, Default)]
struct SampleSums {
    accel: [f64; 3],
    gyro: [f64; 3],
    accel_magnitude: f64,
    gyro_magnitude: f64,
    count: u32,
}

impl SampleSums {
    fn mean(sum: f64, count: u32) -> f64 {
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    fn accel_mean(&self) -> [f64; 3] {
        self.accel.map(|sum| Self::mean(sum, self.count))
    }

    fn gyro_mean(&self) -> [f64; 3] {
        self.gyro.map(|sum| Self::mean(sum, self.count))
    }
}

fn collect<I, D, S>(device: &mut Mpu6050<I, D, S>, samples: u32) -> Result<SampleSums, Mpu6050Error>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
{
    let mut sums = SampleSums::default();
    for _ in 0..samples {
        device.read_fifo_sample()?;
        if let Some(accel) = device.accel() {
            for axis in 0..3 {
                sums.accel[axis] += accel[axis];
            }
        }
        if let Some(gyro) = device.gyro() {
            for axis in 0..3 {
                sums.gyro[axis] += gyro[axis];
            }
        }
        sums.accel_magnitude += device.accel_magnitude().unwrap_or(0.0);
        sums.gyro_magnitude += device.gyro_magnitude().unwrap_or(0.0);
        sums.count += 1;
    }
    Ok(sums)
}

fn restore_configuration<I, D, S>(device: &mut Mpu6050<I, D, S>, saved: RegisterImage) -> Result<(), Mpu6050Error>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
{
    device.set_image(saved)?;
    device.flush_fifo()
}

fn set_stimulus<I, D, S>(device: &mut Mpu6050<I, D, S>, reg: u8, enabled: bool) -> Result<(), Mpu6050Error>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
{
    let mask = bits::XA_ST | bits::YA_ST | bits::ZA_ST;
    device.image.update(reg, |value| if enabled { value | mask } else { value & !mask })?;
    device.apply_image()?;
    device.delay.delay_ms(SELF_TEST_SETTLE_MS);
    device.flush_fifo()
}

/// Media de la diferencia absoluta entre las fases con y sin estímulo
fn stimulus_response<I, D, S>(
    device: &mut Mpu6050<I, D, S>,
    reg: u8,
    samples: u32,
    pick: fn(&SampleSums) -> [f64; 3],
) -> Result<[f64; 3], Mpu6050Error>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
{
    set_stimulus(device, reg, true)?;
    let on = pick(&collect(device, samples)?);
    set_stimulus(device, reg, false)?;
    let off = pick(&collect(device, samples)?);

    let mut response = [0.0; 3];
    for axis in 0..3 {
        response[axis] = (on[axis] - off[axis]).abs() / samples as f64;
    }
    Ok(response)
}

fn self_test_sequence<I, D, S>(device: &mut Mpu6050<I, D, S>) -> Result<SelfTestReport, Mpu6050Error>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
{
    let st = [
        device.read_reg(registers::SELF_TEST_X)?,
        device.read_reg(registers::SELF_TEST_Y)?,
        device.read_reg(registers::SELF_TEST_Z)?,
        device.read_reg(registers::SELF_TEST_A)?,
    ];

    device.set_fifo_channels(bits::ACCEL_FIFO_EN | bits::TEMP_FIFO_EN | bits::GYRO_FIFO_EN, false)?;
    device.set_dlpf(0)?;
    device.set_sample_rate(100)?;
    device.set_clock_source(3)?;
    device.set_accel_range(8)?;
    device.set_gyro_range(250)?;

    // Acelerómetro
    device.set_accel_fifo(true)?;
    let accel = stimulus_response(device, registers::ACCEL_CONFIG, SELF_TEST_SAMPLES, |s| s.accel)?;
    device.set_accel_fifo(false)?;

    // Giroscopio
    device.set_gyro_fifo(true)?;
    let gyro = stimulus_response(device, registers::GYRO_CONFIG, SELF_TEST_SAMPLES, |s| s.gyro)?;
    device.set_gyro_fifo(false)?;

    let accel_lsb = AccelFullScale::Fs8G.lsb_per_g();
    let gyro_lsb = GyroFullScale::Fs250Dps.lsb_per_dps();
    let accel_codes = accel_test_codes(st);
    let gyro_codes = gyro_test_codes(st);

    let mut report = SelfTestReport::default();
    for axis in 0..3 {
        report.accel[axis] = AxisResult::new(accel[axis] * accel_lsb, accel_factory_trim(accel_codes[axis]));
        report.gyro[axis] = AxisResult::new(gyro[axis] * gyro_lsb, gyro_factory_trim(gyro_codes[axis], axis == 1));
    }
    Ok(report)
}

/// Ejecuta el auto-test del MPU6050.
///
/// Reconfigura a filtro 0, 100 Hz, ±8g y ±250°/s, mide la respuesta al estímulo
/// de cada eje y la compara con el trimado de fábrica. La configuración previa se
/// restaura al terminar.
pub fn run_self_test<I, D, S>(device: &mut Mpu6050<I, D, S>) -> Result<SelfTestReport, Mpu6050Error>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
{
    log::info!("Iniciando auto-test del MPU6050");
    let saved = device.image;
    let result = self_test_sequence(device);
    let restored = restore_configuration(device, saved);
    let report = result?;
    restored?;

    for (axis, result) in report.accel.iter().chain(report.gyro.iter()).enumerate() {
        let name = format!("{}{}", AXES[axis % 3], if axis < 3 { "a" } else { "g" });
        if result.pass {
            log::info!("Auto-test {}: {:.2}% (PASS)", name, result.shift_pct);
        } else {
            log::warn!("Auto-test {}: {:.2}% (FAIL)", name, result.shift_pct);
        }
    }
    Ok(report)
}

/// Ejecuta el auto-test y escribe el informe en un fichero.
///
/// Si el fichero no se puede crear, el informe se escribe en stderr.
pub fn run_self_test_to_file<I, D, S, P>(device: &mut Mpu6050<I, D, S>, path: P) -> Result<SelfTestReport, Mpu6050Error>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
    P: AsRef<Path>,
{
    let report = run_self_test(device)?;
    match File::create(path.as_ref()) {
        Ok(mut file) => report.write_to(&mut file)?,
        Err(e) => {
            log::warn!(
                "No se pudo crear {}: {}; el informe se escribe en stderr",
                path.as_ref().display(),
                e
            );
            report.write_to(&mut io::stderr())?;
        }
    }
    Ok(report)
}

/// `original − round(mean × factor)`, saturado a 16 bits
pub fn offset_correction(original: i16, mean: f64, factor: f64) -> i16 {
    let value = original as f64 - (mean * factor).round();
    value.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// El bit 0 de los offsets del acelerómetro está reservado y se conserva del valor original
pub fn with_reserved_bit(custom: i16, original: i16) -> i16 {
    ((custom as u16 & 0xFFFE) | (original as u16 & 0x0001)) as i16
}

fn read_offsets<I, D, S>(device: &mut Mpu6050<I, D, S>) -> Result<[i16; 6], Mpu6050Error>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
{
    let mut offsets = [0i16; 6];
    for (axis, reg) in OFFSET_REGISTERS.iter().enumerate() {
        offsets[axis] = device.read_word(*reg)?;
    }
    Ok(offsets)
}

fn program_gyro_offsets<I, D, S>(device: &mut Mpu6050<I, D, S>, original: [i16; 3], mean: [f64; 3]) -> Result<(), Mpu6050Error>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
{
    let lsb = device.config.gyro_fs.lsb_per_dps();
    for axis in 0..3 {
        let custom = offset_correction(original[axis], mean[axis], lsb);
        device.write_word(OFFSET_REGISTERS[3 + axis], custom)?;
        device.calibration.custom_offsets[3 + axis] = custom;
    }
    Ok(())
}

fn calibration_sequence<I, D, S>(device: &mut Mpu6050<I, D, S>) -> Result<CalibrationRecord, Mpu6050Error>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
{
    // Reset del dispositivo: los registros de offset vuelven a sus valores de fábrica
    device.reset()?;
    let original = read_offsets(device)?;
    device.calibration.reset_for_calibration(original);
    let samples = device.calibration.samples.max(1);

    device.set_fifo_channels(bits::ACCEL_FIFO_EN | bits::GYRO_FIFO_EN, true)?;
    device.set_dlpf(5)?;
    device.set_accel_range(16)?;
    device.set_gyro_range(1000)?;
    device.flush_fifo()?;
    if device.channels.accel_slots().is_none() {
        return Err(Mpu6050Error::ChannelUnavailable(ChannelKind::AccelX));
    }
    if device.channels.gyro_slots().is_none() {
        return Err(Mpu6050Error::ChannelUnavailable(ChannelKind::GyroX));
    }

    // Pasada gruesa. El bias de magnitud viene de la calibración anterior (0 la primera vez).
    let sums = collect(device, samples)?;
    let accel_mean = sums.accel_mean();
    let accel_factor = device.config.accel_fs.lsb_per_g() * device.calibration.accel_magnitude_bias;
    for axis in 0..3 {
        let custom = with_reserved_bit(
            offset_correction(original[axis], accel_mean[axis], accel_factor),
            original[axis],
        );
        device.write_word(OFFSET_REGISTERS[axis], custom)?;
        device.calibration.custom_offsets[axis] = custom;
    }
    program_gyro_offsets(device, [original[3], original[4], original[5]], sums.gyro_mean())?;
    log::debug!("Offsets tras la pasada gruesa: {:?}", device.calibration.custom_offsets);

    // Pasada fina: sólo giroscopio, partiendo de los offsets ya programados
    device.flush_fifo()?;
    let sums = collect(device, samples)?;
    let mut programmed = [0i16; 3];
    for axis in 0..3 {
        programmed[axis] = device.read_word(OFFSET_REGISTERS[3 + axis])?;
        device.calibration.original_offsets[3 + axis] = programmed[axis];
    }
    program_gyro_offsets(device, programmed, sums.gyro_mean())?;
    log::debug!("Offsets tras la pasada fina: {:?}", device.calibration.custom_offsets);

    // Pasada final: bias residuales, quitando 1 g del eje Z y de la magnitud
    let sums = collect(device, samples)?;
    let mut accel_bias = sums.accel_mean();
    accel_bias[2] -= 1.0;
    device.calibration.accel_bias = accel_bias;
    device.calibration.gyro_bias = sums.gyro_mean();
    device.calibration.accel_magnitude_bias = SampleSums::mean(sums.accel_magnitude, sums.count) - 1.0;
    device.calibration.gyro_magnitude_bias = SampleSums::mean(sums.gyro_magnitude, sums.count);

    Ok(device.calibration)
}

/// Calibra offsets y bias del MPU6050.
///
/// El dispositivo debe estar inmóvil y nivelado (eje Z hacia arriba). Al terminar se
/// restaura la configuración previa y se guardan imagen y calibración. Si falla, el
/// registro de calibración anterior se conserva en memoria y en el almacén.
pub fn calibrate<I, D, S>(device: &mut Mpu6050<I, D, S>) -> Result<CalibrationRecord, Mpu6050Error>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
{
    log::info!(
        "Iniciando calibración con {} muestras por pasada",
        device.calibration.samples
    );
    let saved = device.image;
    let previous = device.calibration;
    let result = calibration_sequence(device);
    if result.is_err() {
        // La restauración vuelve a guardar los parámetros: debe guardar la calibración anterior
        device.calibration = previous;
    }
    let restored = restore_configuration(device, saved);
    let record = result?;
    restored?;

    log::info!(
        "Calibración completada: bias accel {:?} g, bias gyro {:?} °/s",
        record.accel_bias,
        record.gyro_bias
    );
    Ok(record)
}
