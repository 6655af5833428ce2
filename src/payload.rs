//! Framing of the packed bit stream on disk.

use log::warn;
use std::io::{self, Read, Write};

use crate::error::{Error, Result};

/// How a [`Compressed`] payload is laid out when written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// Little-endian `u64` bit count, then the packed bytes.
    #[default]
    Counted,
    /// Packed bytes only. The decoder cannot tell padding from data.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressed {
    data: Vec<u8>,
    bit_len: Option<u64>,
}

impl Compressed {
    pub fn new(data: Vec<u8>, bit_len: u64) -> Self {
        Self {
            data,
            bit_len: Some(bit_len),
        }
    }

    /// A payload whose exact bit count is unknown.
    pub fn legacy(data: Vec<u8>) -> Self {
        Self {
            data,
            bit_len: None,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn bit_len(&self) -> Option<u64> {
        self.bit_len
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn write_to<W: Write>(&self, writer: &mut W, framing: Framing) -> Result<()> {
        match framing {
            Framing::Counted => {
                let bit_len = self.bit_len.ok_or_else(|| {
                    Error::corrupt_payload("bit count unknown; only legacy framing can be written")
                })?;
                writer.write_all(&bit_len.to_le_bytes())?;
            }
            Framing::Legacy => {}
        }
        writer.write_all(&self.data)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_from<R: Read>(mut reader: R, framing: Framing) -> Result<Self> {
        match framing {
            Framing::Counted => {
                let mut header = [0u8; 8];
                reader.read_exact(&mut header).map_err(|e| match e.kind() {
                    io::ErrorKind::UnexpectedEof => Error::corrupt_payload("missing bit count header"),
                    _ => Error::Io(e),
                })?;
                let bit_len = u64::from_le_bytes(header);

                let mut data = Vec::new();
                reader.read_to_end(&mut data)?;

                let expected = bit_len.div_ceil(8);
                if data.len() as u64 != expected {
                    return Err(Error::corrupt_payload(format!(
                        "header announces {} bits ({} bytes) but {} bytes follow",
                        bit_len,
                        expected,
                        data.len()
                    )));
                }
                Ok(Self::new(data, bit_len))
            }
            Framing::Legacy => {
                warn!("reading legacy payload; trailing padding may decode as extra symbols");
                let mut data = Vec::new();
                reader.read_to_end(&mut data)?;
                Ok(Self::legacy(data))
            }
        }
    }
}
