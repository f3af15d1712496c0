use thiserror::Error;

/// Errors raised by either cache tier.
///
/// These never reach HTTP callers: write failures are swallowed and read
/// failures degrade to a cache miss.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Error reported by the backing store
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Cached bytes could not be encoded or decoded as a palette
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors from fetching the source image.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The image host answered with a non-success status
    #[error("Image host returned status {status}")]
    Status { status: u16 },

    /// The request never produced a response (DNS, TLS, connection reset, ...)
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Errors from the median-cut quantizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantizeError {
    /// The pixel sample was empty after filtering
    #[error("Pixel sample is empty")]
    EmptyInput,

    /// Requested color count outside the supported range
    #[error("Invalid color count: {count} (must be 2-20)")]
    InvalidColorCount { count: usize },
}

/// Errors that can occur while producing a palette for a request.
#[derive(Debug, Clone, Error)]
pub enum PaletteError {
    /// Color count outside the pipeline's range (single colors use a separate path)
    #[error("`count` should be between 2 and 20, got {count}. Use the single-color endpoint for one color")]
    InvalidColorCount { count: usize },

    /// The image host answered with a non-success status
    #[error("Image fetch failed with status {status}")]
    UpstreamStatus { status: u16 },

    /// The image could not be fetched at all
    #[error("Image fetch failed: {message}")]
    Fetch { message: String },

    /// The fetched bytes are not a decodable image
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// Every sampled pixel was transparent or near-white
    #[error("No representative colors found")]
    NoColors,
}

impl From<FetchError> for PaletteError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Status { status } => PaletteError::UpstreamStatus { status },
            FetchError::Transport(message) => PaletteError::Fetch { message },
        }
    }
}

impl From<QuantizeError> for PaletteError {
    fn from(err: QuantizeError) -> Self {
        match err {
            QuantizeError::EmptyInput => PaletteError::NoColors,
            QuantizeError::InvalidColorCount { count } => PaletteError::InvalidColorCount { count },
        }
    }
}
