//! Byte-addressable non-volatile storage.
//!
//! The `ByteStore` trait abstracts the storage part behind a synchronous
//! single-byte read/write pair, allowing both a file-backed image
//! (production) and an in-memory image (testing, `--ephemeral`).
//! A returned `Ok` means the operation fully completed; there is no
//! pollable status register behind this seam.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use thiserror::Error;

/// Capacity of the modelled EEPROM part, in bytes.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Erased-cell value. A freshly provisioned image reads as all `0xFF`.
pub const ERASED: u8 = 0xFF;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("address {addr} out of range (capacity {len})")]
    OutOfRange { addr: usize, len: usize },
}

/// Blocking single-byte storage over a fixed address range.
pub trait ByteStore {
    fn read_byte(&mut self, addr: usize) -> Result<u8>;

    fn write_byte(&mut self, addr: usize, value: u8) -> Result<()>;

    /// Capacity in bytes. Addresses at or past this fail closed.
    fn len(&self) -> usize;
}

impl ByteStore for Box<dyn ByteStore> {
    fn read_byte(&mut self, addr: usize) -> Result<u8> {
        (**self).read_byte(addr)
    }

    fn write_byte(&mut self, addr: usize, value: u8) -> Result<()> {
        (**self).write_byte(addr, value)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// File-backed storage image.
///
/// Writes go straight through to the file and are flushed before the call
/// returns. A missing or short image is extended with `ERASED` fill so
/// untouched slots decode as absent.
pub struct FileStore {
    file: File,
    len: usize,
}

impl FileStore {
    pub fn open(path: &Path, len: usize) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        let current = file.metadata()?.len() as usize;
        if current < len {
            file.seek(SeekFrom::End(0))?;
            file.write_all(&vec![ERASED; len - current])?;
            file.flush()?;
            tracing::debug!(path = %path.display(), from = current, to = len, "extended storage image");
        }

        Ok(Self { file, len })
    }

    fn check(&self, addr: usize) -> Result<()> {
        if addr >= self.len {
            return Err(StoreError::OutOfRange {
                addr,
                len: self.len,
            });
        }
        Ok(())
    }
}

impl ByteStore for FileStore {
    fn read_byte(&mut self, addr: usize) -> Result<u8> {
        self.check(addr)?;
        self.file.seek(SeekFrom::Start(addr as u64))?;
        let mut buf = [0u8; 1];
        self.file.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn write_byte(&mut self, addr: usize, value: u8) -> Result<()> {
        self.check(addr)?;
        self.file.seek(SeekFrom::Start(addr as u64))?;
        self.file.write_all(&[value])?;
        self.file.flush()?;
        Ok(())
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Volatile in-memory storage image. Nothing survives the process.
pub struct MemStore {
    cells: Vec<u8>,
}

impl MemStore {
    pub fn new(len: usize) -> Self {
        Self {
            cells: vec![ERASED; len],
        }
    }

    fn check(&self, addr: usize) -> Result<()> {
        if addr >= self.cells.len() {
            return Err(StoreError::OutOfRange {
                addr,
                len: self.cells.len(),
            });
        }
        Ok(())
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ByteStore for MemStore {
    fn read_byte(&mut self, addr: usize) -> Result<u8> {
        self.check(addr)?;
        Ok(self.cells[addr])
    }

    fn write_byte(&mut self, addr: usize, value: u8) -> Result<()> {
        self.check(addr)?;
        self.cells[addr] = value;
        Ok(())
    }

    fn len(&self) -> usize {
        self.cells.len()
    }
}
