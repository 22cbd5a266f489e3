use thiserror::Error;

/// Errors surfaced by the codec, its configuration and its framing.
#[derive(Debug, Error)]
pub enum FountainError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("source block of {requested} symbols exceeds the supported maximum of {max}")]
    UnsupportedSize { requested: usize, max: usize },
    #[error("insufficient symbols: rank {rank} of {needed}")]
    InsufficientSymbols { rank: usize, needed: usize },
    #[error("GF(256) arithmetic error: {0}")]
    Arithmetic(&'static str),
    #[error("mismatched parameters: {0}")]
    MismatchedParameters(String),
    #[error("encoding symbol id {0} is not addressable")]
    InvalidSymbolId(u32),
    #[error("malformed packet: {0}")]
    MalformedPacket(String),
    #[error("decoder lock poisoned")]
    LockPoisoned,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl FountainError {
    /// Fatal errors invalidate the session that produced them.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FountainError::Arithmetic(_))
    }
}

pub type Result<T> = std::result::Result<T, FountainError>;
