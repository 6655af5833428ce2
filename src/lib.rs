//! Huffman compression of byte text.
//!
//! ```
//! let text = b"Hello my name is Sam!";
//! let (compressed, tree) = huffman_text::compress(text)?;
//! let decoded = huffman_text::decompress(&compressed, &tree)?;
//! assert_eq!(decoded, text);
//! # Ok::<(), huffman_text::Error>(())
//! ```

pub mod artifact;
pub mod bitio;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frequency;
pub mod payload;
pub mod tree;

use log::info;

pub use artifact::{load_tree, save_tree, TreeArtifact};
pub use decoder::Decoder;
pub use encoder::{write_compressed, Encoder};
pub use error::{Error, Result};
pub use frequency::{calculate_frequencies, FrequencyTable};
pub use payload::{Compressed, Framing};
pub use tree::{Code, CodeTable, HuffmanTree, Node, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStats {
    pub original_bits: u64,
    pub compressed_bits: u64,
}

impl CompressionStats {
    /// Compressed size as a percentage of the original size.
    pub fn ratio(&self) -> f64 {
        if self.original_bits == 0 {
            return 0.0;
        }
        self.compressed_bits as f64 / self.original_bits as f64 * 100.0
    }
}

/// Compresses `text`, returning the packed payload and the tree needed to decode it.
///
/// Fails with [`Error::InvalidInput`] for empty text.
pub fn compress(text: &[u8]) -> Result<(Compressed, TreeArtifact<u8>)> {
    let (compressed, artifact, _) = compress_with_stats(text)?;
    Ok((compressed, artifact))
}

pub fn compress_with_stats(text: &[u8]) -> Result<(Compressed, TreeArtifact<u8>, CompressionStats)> {
    let frequencies = calculate_frequencies(text);
    let tree = HuffmanTree::build(&frequencies)?;
    let bits = tree.encoder().encode(text.iter().copied())?;

    let mut data = Vec::with_capacity(bits.len().div_ceil(8));
    let bit_len = write_compressed(&bits, &mut data)?;

    let stats = CompressionStats {
        original_bits: text.len() as u64 * 8,
        compressed_bits: bit_len,
    };
    info!(
        "compressed {} bytes over {} symbols to {} bits ({:.2}%)",
        text.len(),
        tree.symbol_count(),
        bit_len,
        stats.ratio()
    );

    Ok((Compressed::new(data, bit_len), tree.to_artifact(), stats))
}

/// Recovers the text from a payload produced by [`compress`].
///
/// When the payload knows its bit count the result is exact. A legacy payload
/// is decoded to the end of its bytes, so padding can surface as extra symbols.
pub fn decompress(compressed: &Compressed, artifact: &TreeArtifact<u8>) -> Result<Vec<u8>> {
    let tree = HuffmanTree::from_artifact(artifact.clone())?;
    let decoder = tree.decoder();

    match compressed.bit_len() {
        Some(bit_len) => decoder.decompress_bits(compressed.data(), bit_len),
        None => decoder.decompress(compressed.data()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let s = String::from(
            "This is a really long message, I sure do hope it encodes and decodes properly.",
        );
        let (compressed, tree) = compress(s.as_bytes()).unwrap();
        let dec = String::from_utf8(decompress(&compressed, &tree).unwrap()).unwrap();

        assert_eq!(dec, s);
    }

    #[test]
    fn empty_text_is_invalid() {
        assert!(matches!(compress(b""), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn single_symbol_round_trips() {
        let (compressed, tree) = compress(b"aaaa").unwrap();

        assert_eq!(compressed.bit_len(), Some(4));
        assert_eq!(decompress(&compressed, &tree).unwrap(), b"aaaa");
    }

    #[test]
    fn legacy_payload_keeps_padding_artifacts() {
        let (compressed, tree) = compress(b"aaabbc").unwrap();
        let legacy = Compressed::legacy(compressed.into_data());

        assert_eq!(decompress(&legacy, &tree).unwrap(), b"aaabbcaaaaaaa");
    }

    #[test]
    fn stats_match_payload() {
        let (compressed, _, stats) = compress_with_stats(b"aaabbc").unwrap();

        assert_eq!(stats.original_bits, 48);
        assert_eq!(stats.compressed_bits, 9);
        assert_eq!(compressed.bit_len(), Some(9));
        assert!((stats.ratio() - 18.75).abs() < 1e-9);
    }
}
