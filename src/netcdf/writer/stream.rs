//! Positioned output stream for classic files.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};

use crate::util::Result;

/// Buffered file writer that tracks its position and supports random access.
pub struct OStream {
    writer: BufWriter<File>,
    pos: u64,
}

impl OStream {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: BufWriter::with_capacity(2 * 1024 * 1024, file), // 2MB buffer
            pos: 0,
        })
    }

    /// Write bytes and advance position.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.pos += data.len() as u64;
        Ok(())
    }

    /// Write bytes at an absolute position, seeking only when needed.
    pub fn write_at(&mut self, pos: u64, data: &[u8]) -> Result<()> {
        if pos != self.pos {
            self.seek(pos)?;
        }
        self.write_bytes(data)
    }

    /// Write a u32 value (big-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.writer.write_u32::<BigEndian>(value)?;
        self.pos += 4;
        Ok(())
    }

    /// Write `count` copies of `pattern` starting at `pos`.
    pub fn fill_at(&mut self, pos: u64, pattern: &[u8], count: u64) -> Result<()> {
        const CHUNK_ELEMS: usize = 64 * 1024;
        if count == 0 || pattern.is_empty() {
            return Ok(());
        }
        let per_chunk = CHUNK_ELEMS.min(usize::try_from(count).unwrap_or(CHUNK_ELEMS));
        let chunk = pattern.repeat(per_chunk);
        let mut remaining = count;
        let mut at = pos;
        while remaining > 0 {
            let n = remaining.min(per_chunk as u64) as usize;
            let bytes = &chunk[..n * pattern.len()];
            self.write_at(at, bytes)?;
            at += bytes.len() as u64;
            remaining -= n as u64;
        }
        Ok(())
    }

    /// Seek to a position and return the current position.
    pub fn seek(&mut self, pos: u64) -> Result<u64> {
        self.writer.flush()?;
        let new_pos = self.writer.seek(SeekFrom::Start(pos))?;
        self.pos = new_pos;
        Ok(new_pos)
    }

    /// Flush the buffer to the OS.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and ask the OS to persist file contents.
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        Ok(())
    }
}
