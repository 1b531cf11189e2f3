//! Tabla de canales y buffer de muestras
//!
//! La tabla asigna a cada canal activo de la FIFO un slot del [`SampleBuffer`].
//! Los accesos por nombre ("accel-X", "temperatura"...) son índices opcionales que
//! se resuelven siempre a través de la tabla; al reconstruirla todos los índices
//! anteriores quedan invalidados.

use crate::config::DecodedConfig;
use crate::conversion::{accel_scale, gyro_scale, temp_scale};
use crate::types::data_defs::MAX_SLOTS;

/// Número de auxiliares del bus secundario
pub const AUX_CHANNELS: usize = 5;

const KIND_COUNT: usize = 7 + AUX_CHANNELS;

/// Tipo de canal físico
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    AccelX,
    AccelY,
    AccelZ,
    Temperature,
    GyroX,
    GyroY,
    GyroZ,
    /// Esclavo auxiliar 0..=4 (valor sin escalar)
    Aux(u8),
}

impl ChannelKind {
    pub const ACCEL: [ChannelKind; 3] = [ChannelKind::AccelX, ChannelKind::AccelY, ChannelKind::AccelZ];
    pub const GYRO: [ChannelKind; 3] = [ChannelKind::GyroX, ChannelKind::GyroY, ChannelKind::GyroZ];

    fn index(self) -> Option<usize> {
        match self {
            ChannelKind::AccelX => Some(0),
            ChannelKind::AccelY => Some(1),
            ChannelKind::AccelZ => Some(2),
            ChannelKind::Temperature => Some(3),
            ChannelKind::GyroX => Some(4),
            ChannelKind::GyroY => Some(5),
            ChannelKind::GyroZ => Some(6),
            ChannelKind::Aux(n) if (n as usize) < AUX_CHANNELS => Some(7 + n as usize),
            ChannelKind::Aux(_) => None,
        }
    }

    /// Nombre corto usado en los informes
    pub fn name(self) -> &'static str {
        match self {
            ChannelKind::AccelX => "Ax",
            ChannelKind::AccelY => "Ay",
            ChannelKind::AccelZ => "Az",
            ChannelKind::Temperature => "Temp",
            ChannelKind::GyroX => "Gx",
            ChannelKind::GyroY => "Gy",
            ChannelKind::GyroZ => "Gz",
            ChannelKind::Aux(0) => "Aux0",
            ChannelKind::Aux(1) => "Aux1",
            ChannelKind::Aux(2) => "Aux2",
            ChannelKind::Aux(3) => "Aux3",
            ChannelKind::Aux(_) => "Aux4",
        }
    }
}

/// Índice de un slot del buffer de muestras (nunca 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(u8);

impl SlotIndex {
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// Referencia a un canal válida sólo para la generación de la tabla que la creó
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelHandle {
    pub kind: ChannelKind,
    slot: SlotIndex,
    generation: u32,
}

/// Descriptor de un canal activo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelDescriptor {
    pub kind: ChannelKind,
    pub slot: SlotIndex,
    /// Unidades físicas por LSB
    pub scale: f64,
}

/// Tabla de canales activos
#[derive(Debug, Clone, Default)]
pub struct ChannelTable {
    generation: u32,
    descriptors: Vec<ChannelDescriptor>,
    bindings: [Option<SlotIndex>; KIND_COUNT],
}

impl ChannelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalida todos los accesos y deja los slots 1..31 con escala 1 y valor 0
    pub fn unbind(&mut self, buffer: &mut SampleBuffer) {
        self.bindings = [None; KIND_COUNT];
        self.descriptors.clear();
        self.generation = self.generation.wrapping_add(1);
        buffer.reset_slots();
    }

    /// Reconstruye la tabla a partir de la configuración decodificada.
    ///
    /// Orden fijo: acelerómetro (x, y, z), temperatura, giroscopio x, y, z, auxiliares 0..4.
    pub fn rebind(&mut self, config: &DecodedConfig, buffer: &mut SampleBuffer) {
        self.unbind(buffer);

        let fifo = &config.fifo;
        let mut wanted: Vec<(ChannelKind, f64)> = Vec::with_capacity(KIND_COUNT);
        if fifo.accel {
            let scale = accel_scale(config.accel_fs);
            wanted.extend(ChannelKind::ACCEL.iter().map(|kind| (*kind, scale)));
        }
        if fifo.temp {
            wanted.push((ChannelKind::Temperature, temp_scale()));
        }
        let scale = gyro_scale(config.gyro_fs);
        for (axis, kind) in ChannelKind::GYRO.iter().enumerate() {
            if fifo.gyro[axis] {
                wanted.push((*kind, scale));
            }
        }
        for (n, enabled) in fifo.aux.iter().enumerate() {
            if *enabled {
                wanted.push((ChannelKind::Aux(n as u8), 1.0));
            }
        }

        for (i, (kind, scale)) in wanted.into_iter().enumerate() {
            let slot = SlotIndex(i as u8 + 1);
            buffer.scale[slot.get()] = scale;
            if let Some(index) = kind.index() {
                self.bindings[index] = Some(slot);
            }
            self.descriptors.push(ChannelDescriptor { kind, slot, scale });
        }
        buffer.raw[0] = self.descriptors.len() as i16;

        log::debug!(
            "Tabla de canales reconstruida (generación {}): {} palabras por muestra",
            self.generation,
            self.descriptors.len()
        );
    }

    /// Slot asignado a un canal, o `None` si el canal no está activo
    pub fn slot(&self, kind: ChannelKind) -> Option<SlotIndex> {
        kind.index().and_then(|index| self.bindings[index])
    }

    /// Crea una referencia al canal ligada a la generación actual
    pub fn handle(&self, kind: ChannelKind) -> Option<ChannelHandle> {
        self.slot(kind).map(|slot| ChannelHandle {
            kind,
            slot,
            generation: self.generation,
        })
    }

    /// Resuelve una referencia; devuelve `None` si es de otra generación
    pub fn resolve(&self, handle: &ChannelHandle) -> Option<SlotIndex> {
        if handle.generation != self.generation {
            return None;
        }
        self.slot(handle.kind).filter(|slot| *slot == handle.slot)
    }

    pub fn descriptors(&self) -> &[ChannelDescriptor] {
        &self.descriptors
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn words_per_sample(&self) -> u16 {
        self.descriptors.len() as u16
    }

    /// Slots del acelerómetro si los tres ejes están activos
    pub fn accel_slots(&self) -> Option<[SlotIndex; 3]> {
        Some([
            self.slot(ChannelKind::AccelX)?,
            self.slot(ChannelKind::AccelY)?,
            self.slot(ChannelKind::AccelZ)?,
        ])
    }

    /// Slots del giroscopio si los tres ejes están activos
    pub fn gyro_slots(&self) -> Option<[SlotIndex; 3]> {
        Some([
            self.slot(ChannelKind::GyroX)?,
            self.slot(ChannelKind::GyroY)?,
            self.slot(ChannelKind::GyroZ)?,
        ])
    }
}

/// Buffer de muestras.
///
/// El slot 0 no contiene datos: `raw[0]` guarda las palabras por muestra.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    pub(crate) raw: [i16; MAX_SLOTS],
    pub(crate) scale: [f64; MAX_SLOTS],
    /// Valor actual `[0]` y anterior `[1]`
    pub(crate) value: [[f64; 2]; MAX_SLOTS],
    pub(crate) squared: [f64; MAX_SLOTS],
    pub(crate) mean: [f64; MAX_SLOTS],
    pub(crate) variance: [f64; MAX_SLOTS],
    pub(crate) accel_magnitude: f64,
    pub(crate) gyro_magnitude: f64,
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self {
            raw: [0; MAX_SLOTS],
            scale: [1.0; MAX_SLOTS],
            value: [[0.0; 2]; MAX_SLOTS],
            squared: [0.0; MAX_SLOTS],
            mean: [0.0; MAX_SLOTS],
            variance: [0.0; MAX_SLOTS],
            accel_magnitude: 0.0,
            gyro_magnitude: 0.0,
        }
    }
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset_slots(&mut self) {
        *self = Self::default();
    }

    /// Palabras de 16 bits por muestra (slot 0)
    pub fn words_per_sample(&self) -> u16 {
        self.raw[0] as u16
    }

    /// Guarda una lectura cruda y devuelve el valor escalado
    pub(crate) fn store(&mut self, slot: usize, raw: i16) -> f64 {
        self.raw[slot] = raw;
        self.value[slot][1] = self.value[slot][0];
        self.value[slot][0] = raw as f64 * self.scale[slot];
        self.value[slot][0]
    }

    /// Media y varianza (poblacional) incrementales; `n` es el número de muestras
    /// incluida la actual.
    pub(crate) fn update_statistics(&mut self, slot: usize, n: u64) {
        let x = self.value[slot][0];
        if n <= 1 {
            self.mean[slot] = x;
            self.variance[slot] = 0.0;
            return;
        }
        let n = n as f64;
        let old_mean = self.mean[slot];
        let new_mean = old_mean + (x - old_mean) / n;
        self.variance[slot] = ((n - 1.0) * self.variance[slot] + (x - old_mean) * (x - new_mean)) / n;
        self.mean[slot] = new_mean;
    }

    pub fn raw(&self, slot: SlotIndex) -> i16 {
        self.raw[slot.get()]
    }

    pub fn scale(&self, slot: SlotIndex) -> f64 {
        self.scale[slot.get()]
    }

    pub fn value(&self, slot: SlotIndex) -> f64 {
        self.value[slot.get()][0]
    }

    pub fn previous(&self, slot: SlotIndex) -> f64 {
        self.value[slot.get()][1]
    }

    pub fn squared(&self, slot: SlotIndex) -> f64 {
        self.squared[slot.get()]
    }

    pub fn mean(&self, slot: SlotIndex) -> f64 {
        self.mean[slot.get()]
    }

    pub fn variance(&self, slot: SlotIndex) -> f64 {
        self.variance[slot.get()]
    }

    pub fn accel_magnitude(&self) -> f64 {
        self.accel_magnitude
    }

    pub fn gyro_magnitude(&self) -> f64 {
        self.gyro_magnitude
    }
}

/// Instantánea de un canal con su entrada de calibración
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelReading {
    pub kind: ChannelKind,
    pub slot: SlotIndex,
    pub raw: i16,
    pub value: f64,
    pub previous: f64,
    pub squared: f64,
    pub mean: f64,
    pub variance: f64,
    pub offset: f64,
    pub gain: f64,
    pub drift: f64,
}
