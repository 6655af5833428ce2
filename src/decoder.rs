use log::{debug, warn};
use std::hash::Hash;
use std::io::Read;

use crate::bitio::BitReader;
use crate::error::{Error, Result};
use crate::tree::{HuffmanTree, Node, NodeId};

/// Walks a [`HuffmanTree`] one bit at a time to turn a packed stream back into symbols.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a, Symbol>
where
    Symbol: Hash + Eq,
{
    tree: &'a HuffmanTree<Symbol>,
}

impl<'a, Symbol> Decoder<'a, Symbol>
where
    Symbol: Hash + Eq + Clone,
{
    pub fn new(tree: &'a HuffmanTree<Symbol>) -> Self {
        Self { tree }
    }

    /// Decodes until `source` runs dry.
    ///
    /// The stream carries no length, so the zero padding of the final byte is
    /// decoded like data: it may yield extra copies of the leftmost symbol, and
    /// a code still incomplete at the end of the stream is dropped.
    pub fn decompress<R: Read>(&self, source: R) -> Result<Vec<Symbol>> {
        let root = self.tree.root();
        let mut reader = BitReader::new(source);
        let mut out = Vec::new();
        let mut cursor = root;

        loop {
            let bit = match reader.read_bit() {
                Ok(bit) => bit,
                Err(Error::EndOfStream) => break,
                Err(e) => return Err(e),
            };
            cursor = self.step(cursor, bit, &mut out);
        }

        if cursor != root {
            warn!("stream ended inside a code; the partial code was dropped");
        }
        debug!(
            "decoded {} symbols from {} bits",
            out.len(),
            reader.bits_read()
        );
        Ok(out)
    }

    /// Decodes exactly `bit_len` bits from `source` and ignores whatever follows.
    pub fn decompress_bits<R: Read>(&self, source: R, bit_len: u64) -> Result<Vec<Symbol>> {
        let root = self.tree.root();
        let mut reader = BitReader::new(source);
        let mut out = Vec::new();
        let mut cursor = root;

        for _ in 0..bit_len {
            let bit = match reader.read_bit() {
                Ok(bit) => bit,
                Err(Error::EndOfStream) => {
                    return Err(Error::corrupt_payload(format!(
                        "stream ended after {} of {} bits",
                        reader.bits_read(),
                        bit_len
                    )))
                }
                Err(e) => return Err(e),
            };
            cursor = self.step(cursor, bit, &mut out);
        }

        if cursor != root {
            return Err(Error::corrupt_payload("stream ends inside a code"));
        }
        debug!("decoded {} symbols from {} bits", out.len(), bit_len);
        Ok(out)
    }

    fn step(&self, cursor: NodeId, bit: bool, out: &mut Vec<Symbol>) -> NodeId {
        // a lone leaf root has no children: each bit stands for one symbol
        let next = self.tree.node(cursor).child(bit).unwrap_or(cursor);

        match self.tree.node(next) {
            Node::Leaf { symbol, .. } => {
                out.push(symbol.clone());
                self.tree.root()
            }
            Node::Internal { .. } => next,
        }
    }
}
