//! Volcado de registros e informe de diagnóstico

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};

use crate::device::{Mpu6050, Mpu6050Error};
use crate::interface::Interface;
use crate::register::{register_name, REGISTER_COUNT};
use crate::storage::ParameterStore;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "sí"
    } else {
        "no"
    }
}

/// Lee las 128 direcciones y escribe una línea por registro:
/// dirección en hexadecimal y decimal, nombre (vacío si no está mapeado) y valor.
///
/// Ojo: leer FIFO_R_W consume un byte de la FIFO.
pub fn dump_registers<I, D, S, W>(device: &mut Mpu6050<I, D, S>, out: &mut W) -> Result<(), Mpu6050Error>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
    W: Write,
{
    writeln!(out, "MPU6050 REGISTER DUMP")?;
    writeln!(out, "{:<5} {:>3}  {:<20} {}", "HEX", "DEC", "NAME", "VALUE")?;
    for addr in 0..REGISTER_COUNT as u8 {
        let value = device.read_reg(addr)?;
        writeln!(
            out,
            "0x{:02X}  {:>3}  {:<20} 0x{:02X} ({:>3})",
            addr,
            addr,
            register_name(addr).unwrap_or(""),
            value,
            value
        )?;
    }
    Ok(())
}

/// Volcado de registros a un fichero
pub fn dump_registers_to_file<I, D, S, P>(device: &mut Mpu6050<I, D, S>, path: P) -> Result<(), Mpu6050Error>
where
    I: Interface,
    D: DelayUs<u32> + DelayMs<u32>,
    S: ParameterStore,
    P: AsRef<Path>,
{
    let mut out = BufWriter::new(File::create(path)?);
    dump_registers(device, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Informe legible del estado del driver: configuración decodificada,
/// tabla de canales y calibración.
pub fn write_diagnostics<I, D, S, W>(device: &Mpu6050<I, D, S>, out: &mut W) -> Result<(), Mpu6050Error>
where
    W: Write,
{
    let config = device.config();
    let power = &config.power;
    let filter = &config.filter;
    let timing = &config.timing;

    writeln!(out, "MPU6050 DIAGNOSTICS")?;
    writeln!(out, "Product ID:            {:#04x}", device.product_id())?;
    writeln!(out, "Clock source:          {}", power.clock_source)?;
    writeln!(out, "Sleep / cycle:         {} / {}", yes_no(power.sleep), yes_no(power.cycle))?;
    writeln!(out, "Temperature disabled:  {}", yes_no(power.temp_disabled))?;
    writeln!(out, "Standby accel xyz:     {:?}", power.standby_accel)?;
    writeln!(out, "Standby gyro xyz:      {:?}", power.standby_gyro)?;
    writeln!(out, "Wake frequency:        {} Hz", power.wake_frequency_hz)?;
    writeln!(out, "DLPF:                  {}", filter.dlpf)?;
    writeln!(
        out,
        "Accel bandwidth/delay: {} Hz / {} ms",
        filter.accel_bandwidth_hz, filter.accel_delay_ms
    )?;
    writeln!(
        out,
        "Gyro bandwidth/delay:  {} Hz / {} ms",
        filter.gyro_bandwidth_hz, filter.gyro_delay_ms
    )?;
    writeln!(out, "Gyro output rate:      {} Hz", filter.gyro_output_rate_hz)?;
    writeln!(out, "Sample divider:        {}", timing.divider)?;
    writeln!(out, "Sample rate:           {} Hz", timing.rate_hz)?;
    writeln!(out, "Sample period:         {} s", timing.period_s)?;
    writeln!(out, "Sample wait:           {:?}", timing.wait)?;
    writeln!(
        out,
        "Accel range:           ±{} g ({} LSB/g)",
        config.accel_fs.range_g(),
        config.accel_fs.lsb_per_g()
    )?;
    writeln!(
        out,
        "Gyro range:            ±{} °/s ({} LSB/°/s)",
        config.gyro_fs.range_dps(),
        config.gyro_fs.lsb_per_dps()
    )?;
    writeln!(out, "Accel self-test xyz:   {:?}", config.accel_self_test)?;
    writeln!(out, "Gyro self-test xyz:    {:?}", config.gyro_self_test)?;
    writeln!(out, "FIFO enabled:          {}", yes_no(config.user.fifo_enabled))?;
    writeln!(out, "I2C master enabled:    {}", yes_no(config.user.i2c_master_enabled))?;
    writeln!(out, "FIFO overflow int:     {}", yes_no(config.interrupts.fifo_overflow))?;
    writeln!(out, "Data ready int:        {}", yes_no(config.interrupts.data_ready))?;
    writeln!(out, "Words per sample:      {}", device.buffer().words_per_sample())?;
    writeln!(out, "Samples:               {}", device.sample_count())?;

    writeln!(out, "Channels (generation {}):", device.channels().generation())?;
    for descriptor in device.channels().descriptors() {
        writeln!(
            out,
            "  slot {:>2}  {:<5} scale {:.9}",
            descriptor.slot.get(),
            descriptor.kind.name(),
            descriptor.scale
        )?;
    }

    let calibration = device.calibration();
    writeln!(out, "Calibration samples:   {}", calibration.samples)?;
    writeln!(out, "Original offsets:      {:?}", calibration.original_offsets)?;
    writeln!(out, "Custom offsets:        {:?}", calibration.custom_offsets)?;
    writeln!(out, "Accel bias:            {:?}", calibration.accel_bias)?;
    writeln!(out, "Gyro bias:             {:?}", calibration.gyro_bias)?;
    writeln!(
        out,
        "Magnitude bias:        {} g / {} °/s",
        calibration.accel_magnitude_bias, calibration.gyro_magnitude_bias
    )?;
    Ok(())
}
