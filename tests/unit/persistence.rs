//! Pruebas de guardado y restauración de parámetros

use std::io;

use mpu6050_rs::calibration::CalibrationRecord;
use mpu6050_rs::config::RegisterImage;
use mpu6050_rs::register::registers;
use mpu6050_rs::storage;
use mpu6050_rs::{FileStore, InitMode, MemoryStore, Mpu6050, Mpu6050Error, ParameterStore};

use crate::common::{create_mock_driver, MockDelay, MockInterface};

/// Almacén que siempre falla al guardar
struct ReadOnlyStore;

impl ParameterStore for ReadOnlyStore {
    fn save(&mut self, _image: &RegisterImage, _record: &CalibrationRecord) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "sólo lectura"))
    }

    fn load(&mut self) -> io::Result<(RegisterImage, CalibrationRecord)> {
        Err(io::Error::new(io::ErrorKind::NotFound, "vacío"))
    }
}

#[test]
fn test_reset_persists_factory_parameters() {
    let (mut device, _interface, _) = create_mock_driver();
    device.set_gyro_range(500).unwrap();
    let image = *device.image();

    let (_, _, store) = device.release();
    let (saved_image, saved_record) = storage::decode(store.blob().unwrap()).unwrap();
    assert_eq!(saved_image, image);
    assert_eq!(saved_record, CalibrationRecord::new());
}

#[test]
fn test_restore_without_parameters_fails() {
    let result = Mpu6050::builder(MockInterface::new(), MockDelay::new())
        .store(MemoryStore::new())
        .mode(InitMode::Restore)
        .build();
    assert!(matches!(result, Err(Mpu6050Error::Storage(io::ErrorKind::NotFound))));
}

#[test]
fn test_restore_does_not_rewrite_configuration() {
    let mut image = RegisterImage::factory_default();
    image.set_field(registers::SMPLRT_DIV, 15).unwrap();
    image.set_field(registers::ACCEL_CONFIG, 0x18).unwrap();
    let mut record = CalibrationRecord::new();
    record.gyro_bias = [0.1, 0.2, 0.3];

    let interface = MockInterface::new();
    interface.preload_image(&image);
    let device = Mpu6050::builder(interface.clone(), MockDelay::new())
        .store(MemoryStore::with_parameters(&image, &record))
        .mode(InitMode::Restore)
        .build()
        .unwrap();

    assert!(interface.writes_to(registers::SMPLRT_DIV).is_empty());
    assert!(interface.writes_to(registers::ACCEL_CONFIG).is_empty());
    assert_eq!(*device.image(), image);
    assert_eq!(device.config().timing.divider, 15);
    assert_eq!(device.calibration().gyro_bias, [0.1, 0.2, 0.3]);
    assert_eq!(device.buffer().words_per_sample(), 7);
}

#[test]
fn test_restore_overrides_calibration_samples() {
    let image = RegisterImage::factory_default();
    let interface = MockInterface::new();
    interface.preload_image(&image);
    let device = Mpu6050::builder(interface, MockDelay::new())
        .store(MemoryStore::with_parameters(&image, &CalibrationRecord::new()))
        .mode(InitMode::Restore)
        .calibration_samples(64)
        .build()
        .unwrap();
    assert_eq!(device.calibration().samples, 64);
}

#[test]
fn test_save_failure_is_not_fatal() {
    let mut device = Mpu6050::builder(MockInterface::new(), MockDelay::new())
        .store(ReadOnlyStore)
        .mode(InitMode::Reset)
        .build()
        .unwrap();

    device.set_sample_rate(200).unwrap();
    assert_eq!(
        device.save_parameters(),
        Err(Mpu6050Error::Storage(io::ErrorKind::PermissionDenied))
    );
}

#[test]
fn test_file_store_round_trip() {
    let path = std::env::temp_dir().join(format!("mpu6050_cfg_{}.bin", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let mut device = Mpu6050::builder(MockInterface::new(), MockDelay::new())
        .store(FileStore::new(&path))
        .mode(InitMode::Reset)
        .build()
        .unwrap();
    device.set_dlpf(3).unwrap();
    let image = *device.image();
    drop(device);

    assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, storage::BLOB_SIZE);

    let interface = MockInterface::new();
    interface.preload_image(&image);
    let restored = Mpu6050::builder(interface, MockDelay::new())
        .store(FileStore::new(&path))
        .mode(InitMode::Restore)
        .build()
        .unwrap();
    assert_eq!(*restored.image(), image);
    assert_eq!(restored.config().filter.dlpf, 3);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_missing_file_store() {
    let result = Mpu6050::builder(MockInterface::new(), MockDelay::new())
        .store(FileStore::new("/nonexistent-mpu6050-dir/cfg.bin"))
        .mode(InitMode::Restore)
        .build();
    assert!(matches!(result, Err(Mpu6050Error::Storage(io::ErrorKind::NotFound))));
}
