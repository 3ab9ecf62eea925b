//! Error types for markup parsing.

/// Error while parsing markup into a tree.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Tokenizer error.
    #[error("markup parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Encoding error while decoding text or names.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}
