//! Error types for compression and decompression.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The frequency table was empty, so there is nothing to build a tree from.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// The encoder was handed a symbol that has no code.
    #[error("symbol at position {position} has no code in the code table")]
    UnknownSymbol { position: usize },

    /// The bit reader ran out of bytes. Consumed by the decoder.
    #[error("end of bit stream")]
    EndOfStream,

    /// A loaded tree artifact does not describe a valid prefix tree.
    #[error("corrupt tree artifact: {0}")]
    CorruptArtifact(String),

    /// A framed payload is inconsistent with its header or with the tree.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn corrupt_artifact(message: impl Into<String>) -> Self {
        Error::CorruptArtifact(message.into())
    }

    pub(crate) fn corrupt_payload(message: impl Into<String>) -> Self {
        Error::CorruptPayload(message.into())
    }
}
