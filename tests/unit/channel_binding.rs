//! Pruebas de la tabla de canales y del orden de los slots

use approx::assert_relative_eq;
use mpu6050_rs::config::RegisterImage;
use mpu6050_rs::register::registers;
use mpu6050_rs::types::bits;
use mpu6050_rs::ChannelKind;

use crate::common::create_mock_driver;

#[test]
fn test_factory_binding_order() {
    let (device, _interface, _) = create_mock_driver();

    let kinds: Vec<ChannelKind> = device.channels().descriptors().iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ChannelKind::AccelX,
            ChannelKind::AccelY,
            ChannelKind::AccelZ,
            ChannelKind::Temperature,
            ChannelKind::GyroX,
            ChannelKind::GyroY,
            ChannelKind::GyroZ,
        ]
    );
    let slots: Vec<usize> = device.channels().descriptors().iter().map(|d| d.slot.get()).collect();
    assert_eq!(slots, vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(device.buffer().words_per_sample(), 7);
    assert_eq!(device.config().fifo.words_per_sample(), 7);
}

#[test]
fn test_channel_scales_follow_ranges() {
    let (mut device, _interface, _) = create_mock_driver();
    device.set_accel_range(8).unwrap();
    device.set_gyro_range(2000).unwrap();

    let accel = device.channel(ChannelKind::AccelX).unwrap();
    let gyro = device.channel(ChannelKind::GyroZ).unwrap();
    let temp = device.channel(ChannelKind::Temperature).unwrap();
    assert_relative_eq!(device.buffer().scale(accel.slot), 1.0 / 4096.0);
    assert_relative_eq!(device.buffer().scale(gyro.slot), 1.0 / 16.4, epsilon = 1e-9);
    assert_relative_eq!(device.buffer().scale(temp.slot), 1.0 / 340.0);
}

#[test]
fn test_disabling_accel_rebinds_remaining_channels() {
    let (mut device, _interface, _) = create_mock_driver();
    let old_handle = device.channels().handle(ChannelKind::GyroX).unwrap();
    assert!(device.channels().resolve(&old_handle).is_some());

    device.set_accel_fifo(false).unwrap();

    assert!(device.accel().is_none());
    assert!(device.accel_magnitude().is_none());
    assert_eq!(device.channels().slot(ChannelKind::Temperature).unwrap().get(), 1);
    assert_eq!(device.channels().slot(ChannelKind::GyroX).unwrap().get(), 2);
    assert_eq!(device.channels().slot(ChannelKind::GyroZ).unwrap().get(), 4);
    assert_eq!(device.buffer().words_per_sample(), 4);

    // Las referencias de una generación anterior dejan de resolver
    assert!(device.channels().resolve(&old_handle).is_none());
    let new_handle = device.channels().handle(ChannelKind::GyroX).unwrap();
    assert!(device.channels().resolve(&new_handle).is_some());
}

#[test]
fn test_single_gyro_axis() {
    let (mut device, interface, _) = create_mock_driver();
    device.set_gyro_fifo(false).unwrap();
    device.set_fifo_channels(bits::YG_FIFO_EN, true).unwrap();

    assert_eq!(device.buffer().words_per_sample(), 5);
    assert!(device.gyro().is_none());
    assert!(device.gyro_magnitude().is_none());

    interface.set_gyro_data(0, 262, 0);
    device.read_fifo_sample().unwrap();
    assert_relative_eq!(device.value(ChannelKind::GyroY).unwrap(), 2.0, epsilon = 1e-9);
    assert!(device.value(ChannelKind::GyroX).is_none());
}

#[test]
fn test_aux_channels_from_fifo_and_master_control() {
    let (mut device, interface, _) = create_mock_driver();

    let mut image = RegisterImage::factory_default();
    image.set_field(registers::FIFO_EN, 0xF8 | bits::SLV0_FIFO_EN).unwrap();
    image.insert(registers::I2C_MST_CTRL, bits::SLV3_FIFO_EN).unwrap();
    device.set_image(image).unwrap();

    assert_eq!(device.buffer().words_per_sample(), 9);
    assert_eq!(device.channels().slot(ChannelKind::Aux(0)).unwrap().get(), 8);
    assert_eq!(device.channels().slot(ChannelKind::Aux(3)).unwrap().get(), 9);
    assert!(device.aux(1).is_none());
    assert!(device.aux(4).is_none());

    interface.set_aux_data([5, 0, 0, -7]);
    interface.set_accel_data(0, 0, 16384);
    device.flush_fifo().unwrap();
    device.read_fifo_sample().unwrap();

    assert_relative_eq!(device.aux(0).unwrap(), 5.0);
    assert_relative_eq!(device.aux(3).unwrap(), -7.0);
    assert_relative_eq!(device.accel().unwrap()[2], 1.0);
}

#[test]
fn test_no_fifo_channels() {
    let (mut device, _interface, _) = create_mock_driver();
    device.set_fifo_channels(0xFF, false).unwrap();

    assert!(device.channels().descriptors().is_empty());
    assert_eq!(device.buffer().words_per_sample(), 0);
    device.read_fifo_sample().unwrap();
    assert_eq!(device.sample_count(), 0);
}
