use thiserror::Error;

/// Fatal configuration problems. A widget that fails validation never
/// reaches its interactive state.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("widget configured with {count} options, allowed range is {min}..={max}")]
    OptionCountOutOfBounds {
        count: usize,
        min: usize,
        max: usize,
    },
    #[error("option at position {position} carries index {index}, expected {position}")]
    NonContiguousOptionIndex { position: usize, index: usize },
}

/// Rejected endpoint URLs. Treated as "no remote data" by callers, never as
/// a fatal widget error.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid endpoint url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("unsupported endpoint scheme '{scheme}', only http and https are accepted")]
    UnsupportedScheme { scheme: String },
}
