//! Bit-granular adapters over byte sinks and sources.
//!
//! Both sides pack bits MSB-first: the first bit written lands in bit 7 of
//! the first byte. A trailing partial byte is padded with zero bits.

use std::io::{self, Read, Write};

use crate::error::{Error, Result};

pub struct BitWriter<W> {
    inner: W,
    current: u8,
    // number of bits already placed in `current`, 0..=7
    filled: u8,
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            current: 0,
            filled: 0,
            bits_written: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        if bit {
            self.current |= 1 << (7 - self.filled);
        }
        self.filled += 1;
        self.bits_written += 1;

        if self.filled == 8 {
            self.inner.write_all(&[self.current])?;
            self.current = 0;
            self.filled = 0;
        }

        Ok(())
    }

    pub fn write_bits(&mut self, bits: impl IntoIterator<Item = bool>) -> Result<()> {
        for bit in bits {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Emits the pending partial byte (if any), flushes the sink and hands it back.
    pub fn finish(mut self) -> Result<W> {
        if self.filled > 0 {
            self.inner.write_all(&[self.current])?;
            self.current = 0;
            self.filled = 0;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

pub struct BitReader<R> {
    inner: R,
    current: u8,
    // bits of `current` not yet handed out; 0 means a byte must be pulled
    remaining: u8,
    bits_read: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            current: 0,
            remaining: 0,
            bits_read: 0,
        }
    }

    /// Returns the next bit, or [`Error::EndOfStream`] once the source is drained.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.remaining == 0 {
            self.current = self.pull_byte()?;
            self.remaining = 8;
        }

        self.remaining -= 1;
        self.bits_read += 1;
        Ok((self.current >> self.remaining) & 1 == 1)
    }

    pub fn bits_read(&self) -> u64 {
        self.bits_read
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn pull_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Err(Error::EndOfStream),
                Ok(_) => return Ok(buf[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
