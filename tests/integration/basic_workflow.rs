//! Flujo completo: inicialización, configuración, calibración, auto-test y lectura

use approx::assert_relative_eq;
use mpu6050_rs::diag::{dump_registers, write_diagnostics};
use mpu6050_rs::interface::I2cInterface;
use mpu6050_rs::{calibrate, new_i2c_device, run_self_test, InitMode, MemoryStore, Mpu6050};

use crate::common::{MockDelay, MockInterface};

#[test]
fn test_complete_workflow() {
    let interface = MockInterface::new();
    interface.set_product_id(0x57);
    interface.set_self_test_registers([0x01, 0x01, 0x01, 0x15]);
    interface.set_accel_stimulus([1500, 1500, 1500]);
    interface.set_gyro_stimulus([3275, -3275, 3275]);

    let mut device = Mpu6050::builder(interface.clone(), MockDelay::new())
        .store(MemoryStore::new())
        .mode(InitMode::Reset)
        .calibration_samples(16)
        .build()
        .unwrap();
    assert_eq!(device.product_id(), 0x57);

    // Configuración
    device.set_dlpf(3).unwrap();
    device.set_sample_rate(200).unwrap();
    device.set_accel_range(4).unwrap();
    device.set_gyro_range(500).unwrap();
    assert_relative_eq!(device.sample_rate_hz(), 200.0);

    // Dispositivo quieto y nivelado con una pequeña deriva del giroscopio.
    // La calibración trabaja a ±16g: 1 g son 2048 LSB.
    interface.set_accel_data(0, 0, 2048);
    interface.set_gyro_data(65, -131, 33);
    interface.set_temperature_data(-1000);

    let record = calibrate(&mut device).unwrap();
    assert_eq!(&record.custom_offsets[3..], &[-65, 131, -33]);
    assert_eq!(device.config().accel_fs.range_g(), 4);

    let report = run_self_test(&mut device).unwrap();
    assert!(report.passed());

    // Streaming a ±4g con offsets ya programados: el giroscopio queda a cero
    interface.set_accel_data(0, 0, 8192);
    for _ in 0..10 {
        device.read_data().unwrap();
        let accel = device.accel().unwrap();
        assert_relative_eq!(accel[2], -1.0, epsilon = 1e-9);
        let gyro = device.gyro().unwrap();
        for value in gyro.iter() {
            assert_relative_eq!(*value, 0.0, epsilon = 1e-9);
        }
        assert_relative_eq!(
            device.temperature().unwrap(),
            -1000.0 / 340.0 + 36.53,
            epsilon = 1e-9
        );
    }
    assert_eq!(device.sample_count(), 10);

    let mut report_text = Vec::new();
    write_diagnostics(&device, &mut report_text).unwrap();
    assert!(String::from_utf8(report_text).unwrap().contains("DLPF:                  3"));

    let mut dump = Vec::new();
    dump_registers(&mut device, &mut dump).unwrap();
    assert_eq!(String::from_utf8(dump).unwrap().lines().count(), 130);
}

/// Bus I2C simulado: un banco de registros con autoincremento
struct FakeI2c {
    registers: [u8; 128],
}

impl embedded_hal::blocking::i2c::Write for FakeI2c {
    type Error = ();

    fn write(&mut self, _address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        let reg = bytes[0] as usize;
        for (i, value) in bytes[1..].iter().enumerate() {
            self.registers[reg + i] = *value;
        }
        Ok(())
    }
}

impl embedded_hal::blocking::i2c::WriteRead for FakeI2c {
    type Error = ();

    fn write_read(&mut self, _address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
        let reg = bytes[0] as usize;
        buffer.copy_from_slice(&self.registers[reg..reg + buffer.len()]);
        Ok(())
    }
}

#[test]
fn test_i2c_constructor() {
    let mut registers = [0u8; 128];
    registers[0x6B] = 0x40;
    registers[0x0C] = 0x57;

    let path = std::env::temp_dir().join(format!("mpu6050_i2c_{}", std::process::id()));
    std::fs::create_dir_all(&path).unwrap();
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(&path).unwrap();

    let result = new_i2c_device(FakeI2c { registers }, 0x68, MockDelay::new(), InitMode::Reset);

    std::env::set_current_dir(previous).unwrap();
    let device = result.unwrap();
    assert_eq!(device.product_id(), 0x57);
    assert_eq!(device.buffer().words_per_sample(), 7);
    assert!(path.join("mpu6050_cfg.bin").exists());

    let (interface, _, _): (I2cInterface<FakeI2c>, _, _) = device.release();
    assert_eq!(interface.address(), 0x68);
    let bus = interface.release();
    assert_eq!(bus.registers[0x19], 0x4F);
    assert_eq!(bus.registers[0x23], 0xF8);
    std::fs::remove_dir_all(&path).unwrap();
}
