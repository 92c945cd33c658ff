/// Result type for encoding operations.
pub type Result<T> = std::result::Result<T, PngError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PngError {
    /// Dimensions or pixel buffer don't describe a valid image. Raised before
    /// any output is produced.
    #[error("invalid image data: {0}")]
    InvalidImageData(String),
    /// The compressor could not be configured or did not finish.
    #[error("encoding failed: {0}")]
    EncodingFailed(String),
}
