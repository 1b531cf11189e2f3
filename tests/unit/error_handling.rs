//! Pruebas de propagación de errores

use mpu6050_rs::config::RegisterImage;
use mpu6050_rs::register::registers;
use mpu6050_rs::{ChannelKind, InitMode, MemoryStore, Mpu6050, Mpu6050Error};

use crate::common::{create_mock_driver, MockDelay, MockInterface};

#[test]
fn test_read_failure_is_bus_error() {
    let (mut device, interface, _) = create_mock_driver();

    interface.fail_next_read();
    assert_eq!(device.fifo_count(), Err(Mpu6050Error::BusError));

    interface.fail_next_read();
    assert_eq!(device.read_fifo_sample(), Err(Mpu6050Error::BusError));

    // El bus vuelve a funcionar
    device.read_fifo_sample().unwrap();
}

#[test]
fn test_write_failure_unbinds_channels() {
    let (mut device, interface, _) = create_mock_driver();

    interface.fail_next_write();
    assert_eq!(device.set_sample_rate(200), Err(Mpu6050Error::BusError));
    assert!(device.accel().is_none());
    assert_eq!(device.buffer().words_per_sample(), 0);

    // Reaplicar la imagen recupera los canales
    device.apply_image().unwrap();
    assert_eq!(device.buffer().words_per_sample(), 7);
}

#[test]
fn test_build_fails_on_bus_error() {
    let interface = MockInterface::new();
    interface.fail_next_read();
    let result = Mpu6050::builder(interface, MockDelay::new())
        .store(MemoryStore::new())
        .mode(InitMode::Reset)
        .build();
    assert!(matches!(result, Err(Mpu6050Error::BusError)));
}

#[test]
fn test_image_lookup_errors() {
    let image = RegisterImage::factory_default();
    assert_eq!(image.get(0), Err(Mpu6050Error::InvalidArgument));
    assert_eq!(
        image.get(registers::FF_THR),
        Err(Mpu6050Error::UnconfiguredRegister(registers::FF_THR))
    );

    let empty = RegisterImage::empty();
    assert!(matches!(
        empty.decode(),
        Err(Mpu6050Error::UnconfiguredRegister(_))
    ));
}

#[test]
fn test_error_messages() {
    assert_eq!(Mpu6050Error::Timeout.to_string(), "tiempo de espera agotado");
    assert_eq!(
        Mpu6050Error::ValidationMismatch { register: 0x19, written: 0x9F, read: 0x4F }.to_string(),
        "validación fallida en el registro 0x19: escrito 0x9f, leído 0x4f"
    );
    assert_eq!(
        Mpu6050Error::ChannelUnavailable(ChannelKind::GyroX).to_string(),
        "canal Gx no activo"
    );
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "x");
    assert_eq!(Mpu6050Error::from(io_error), Mpu6050Error::Storage(std::io::ErrorKind::NotFound));
}
