//! MPU6050 - Ejemplo básico en Linux
//!
//! Uso: linux_basic [/dev/i2c-N] [--restore] [--self-test] [--calibrate] [--dump]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mpu6050_rs::diag;
use mpu6050_rs::selftest;
use mpu6050_rs::{calibrate, open_linux_device, InitMode};

fn main() {
    println!("MPU6050 - Ejemplo básico");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let path = args
        .iter()
        .find(|arg| !arg.starts_with("--"))
        .map(String::as_str)
        .unwrap_or("/dev/i2c-1");
    let flag = |name: &str| args.iter().any(|arg| arg == name);
    let mode = if flag("--restore") { InitMode::Restore } else { InitMode::Reset };

    // Flag para detener el bucle con Ctrl+C
    let stop = Arc::new(AtomicBool::new(false));
    if let Err(e) = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&stop)) {
        eprintln!("Error al registrar el manejador de Ctrl+C: {:?}", e);
        return;
    }

    let mut device = match open_linux_device(path, mode) {
        Ok(device) => device,
        Err(e) => {
            eprintln!("Error al inicializar el dispositivo en {}: {}", path, e);
            return;
        }
    };
    println!(
        "Dispositivo inicializado: PROD_ID {:#04x}, {} Hz",
        device.product_id(),
        device.sample_rate_hz()
    );

    if flag("--self-test") {
        match selftest::run_self_test_to_file(&mut device, "mpu6050_selftest.txt") {
            Ok(report) => {
                report.write_to(&mut std::io::stdout()).ok();
                if !report.passed() {
                    println!("Self-test fallido");
                }
            }
            Err(e) => eprintln!("Error en el self-test: {}", e),
        }
    }

    if flag("--calibrate") {
        println!("Calibrando: mantén el sensor quieto y nivelado...");
        match calibrate(&mut device) {
            Ok(record) => println!("Offsets programados: {:?}", record.custom_offsets),
            Err(e) => {
                eprintln!("Error al calibrar: {}", e);
                return;
            }
        }
    }

    if flag("--dump") {
        if let Err(e) = diag::dump_registers(&mut device, &mut std::io::stdout()) {
            eprintln!("Error al volcar los registros: {}", e);
        }
        diag::write_diagnostics(&device, &mut std::io::stdout()).ok();
    }

    println!("Leyendo datos. Presiona Ctrl+C para detener...");
    while !stop.load(Ordering::Relaxed) {
        if let Err(e) = device.read_fifo_sample_timeout(Duration::from_millis(500)) {
            eprintln!("Error al leer la FIFO: {}", e);
            continue;
        }
        device.fix_axis_orientation();

        if let Some(accel) = device.accel() {
            println!(
                "Aceleración: x={:.3}G, y={:.3}G, z={:.3}G  |a|={:.3}G",
                accel[0],
                accel[1],
                accel[2],
                device.accel_magnitude().unwrap_or(0.0)
            );
        }
        if let Some(gyro) = device.gyro() {
            println!("Giroscopio: x={:.2}°/s, y={:.2}°/s, z={:.2}°/s", gyro[0], gyro[1], gyro[2]);
        }
        if let Some(temp) = device.temperature() {
            println!("Temperatura: {:.2}°C", temp);
        }
    }

    println!("Ejemplo finalizado ({} muestras)", device.sample_count());
}
