//! Pruebas del volcado de registros y del informe de diagnóstico

use mpu6050_rs::diag::{dump_registers, dump_registers_to_file, write_diagnostics};
use mpu6050_rs::register::registers;

use crate::common::{create_mock_driver, create_mock_driver_with};

#[test]
fn test_register_dump_format() {
    let (mut device, _interface, _) = create_mock_driver_with(|interface| {
        interface.set_product_id(0x57);
    });

    let mut out = Vec::new();
    dump_registers(&mut device, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 2 + 128);
    assert_eq!(lines[0], "MPU6050 REGISTER DUMP");

    let prod_id = lines[2 + registers::PROD_ID as usize];
    assert!(prod_id.starts_with("0x0C   12  PROD_ID"));
    assert!(prod_id.ends_with("0x57 ( 87)"));

    let pwr = lines[2 + registers::PWR_MGMT_1 as usize];
    assert!(pwr.contains("PWR_MGMT_1"));
    assert!(pwr.ends_with("0x03 (  3)"));

    let who = lines[2 + registers::WHO_AM_I as usize];
    assert!(who.contains("WHO_AM_I"));
    assert!(who.ends_with("0x68 (104)"));

    // Dirección sin nombre
    let unnamed = lines[2];
    assert!(unnamed.starts_with("0x00    0  "));
    assert!(!unnamed.contains('_'));
}

#[test]
fn test_register_dump_to_file() {
    let (mut device, _interface, _) = create_mock_driver();
    let path = std::env::temp_dir().join(format!("mpu6050_dump_{}.txt", std::process::id()));

    dump_registers_to_file(&mut device, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 130);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_diagnostics_report() {
    let (mut device, _interface, _) = create_mock_driver_with(|interface| {
        interface.set_product_id(0x57);
    });
    device.set_accel_range(4).unwrap();

    let mut out = Vec::new();
    write_diagnostics(&device, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("MPU6050 DIAGNOSTICS"));
    assert!(text.contains("Product ID:            0x57"));
    assert!(text.contains("Sample rate:           100 Hz"));
    assert!(text.contains("Accel range:           ±4 g (8192 LSB/g)"));
    assert!(text.contains("Words per sample:      7"));
    assert!(text.contains("Temp"));
    assert!(text.contains("Calibration samples:   1000"));
}
