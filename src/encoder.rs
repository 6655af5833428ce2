use bitvec::prelude::*;
use log::debug;
use std::hash::Hash;
use std::io::Write;

use crate::bitio::BitWriter;
use crate::error::{Error, Result};
use crate::tree::CodeTable;

#[derive(Debug, Clone, Copy)]
pub struct Encoder<'a, Symbol>
where
    Symbol: Hash + Eq,
{
    codes: &'a CodeTable<Symbol>,
}

impl<'a, Symbol> Encoder<'a, Symbol>
where
    Symbol: Hash + Eq,
{
    pub fn new(codes: &'a CodeTable<Symbol>) -> Self {
        Self { codes }
    }

    /// Concatenates the code of every symbol in `stream`.
    ///
    /// A symbol without a code fails the whole call with
    /// [`Error::UnknownSymbol`]; nothing partial is returned.
    pub fn encode(&self, stream: impl IntoIterator<Item = Symbol>) -> Result<BitVec<u8, Msb0>> {
        let mut out = BitVec::new();
        for (position, s) in stream.into_iter().enumerate() {
            let code = self
                .codes
                .get(&s)
                .ok_or(Error::UnknownSymbol { position })?;
            out.extend_from_bitslice(code);
        }

        Ok(out)
    }
}

/// Packs `bits` into `sink`, zero padding the last byte. Returns the number of bits written.
pub fn write_compressed<W: Write>(bits: &BitSlice<u8, Msb0>, sink: W) -> Result<u64> {
    let mut writer = BitWriter::new(sink);
    writer.write_bits(bits.iter().by_vals())?;
    let written = writer.bits_written();
    writer.finish()?;

    debug!(
        "wrote {} bits in {} bytes",
        written,
        written.div_ceil(8)
    );
    Ok(written)
}
