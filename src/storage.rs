//! Persistencia de la configuración y la calibración
//!
//! El formato es un bloque binario plano: los bytes de [`RegisterImage`] seguidos
//! de los bytes de [`CalibrationRecord`]. No lleva versión; un cambio en la
//! disposición de cualquiera de las dos estructuras invalida los ficheros existentes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::calibration::CalibrationRecord;
use crate::config::RegisterImage;
use crate::types::data_defs::DEFAULT_PARAMETER_FILE;

const IMAGE_BYTES: usize = core::mem::size_of::<RegisterImage>();
const RECORD_BYTES: usize = core::mem::size_of::<CalibrationRecord>();

/// Tamaño del bloque persistido
pub const BLOB_SIZE: usize = IMAGE_BYTES + RECORD_BYTES;

/// Serializa imagen y calibración en un único bloque
pub fn encode(image: &RegisterImage, record: &CalibrationRecord) -> Vec<u8> {
    let mut blob = Vec::with_capacity(BLOB_SIZE);
    blob.extend_from_slice(bytemuck::bytes_of(image));
    blob.extend_from_slice(bytemuck::bytes_of(record));
    blob
}

/// Deserializa un bloque generado por [`encode`]
pub fn decode(blob: &[u8]) -> io::Result<(RegisterImage, CalibrationRecord)> {
    if blob.len() != BLOB_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("tamaño de parámetros inválido: {} bytes, se esperaban {}", blob.len(), BLOB_SIZE),
        ));
    }
    let image: RegisterImage = bytemuck::pod_read_unaligned(&blob[..IMAGE_BYTES]);
    let record: CalibrationRecord = bytemuck::pod_read_unaligned(&blob[IMAGE_BYTES..]);
    Ok((image, record))
}

/// Almacén de parámetros del dispositivo
pub trait ParameterStore {
    fn save(&mut self, image: &RegisterImage, record: &CalibrationRecord) -> io::Result<()>;
    fn load(&mut self) -> io::Result<(RegisterImage, CalibrationRecord)>;
}

/// Almacén en fichero
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(DEFAULT_PARAMETER_FILE)
    }
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ParameterStore for FileStore {
    fn save(&mut self, image: &RegisterImage, record: &CalibrationRecord) -> io::Result<()> {
        fs::write(&self.path, encode(image, record))
    }

    fn load(&mut self) -> io::Result<(RegisterImage, CalibrationRecord)> {
        decode(&fs::read(&self.path)?)
    }
}

/// Almacén en memoria, útil en pruebas o cuando no se quiere tocar el disco
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Option<Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Almacén que ya contiene unos parámetros
    pub fn with_parameters(image: &RegisterImage, record: &CalibrationRecord) -> Self {
        Self {
            blob: Some(encode(image, record)),
        }
    }

    pub fn blob(&self) -> Option<&[u8]> {
        self.blob.as_deref()
    }
}

impl ParameterStore for MemoryStore {
    fn save(&mut self, image: &RegisterImage, record: &CalibrationRecord) -> io::Result<()> {
        self.blob = Some(encode(image, record));
        Ok(())
    }

    fn load(&mut self) -> io::Result<(RegisterImage, CalibrationRecord)> {
        match &self.blob {
            Some(blob) => decode(blob),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no hay parámetros guardados")),
        }
    }
}
