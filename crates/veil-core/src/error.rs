use thiserror::Error;

/// Error type for key handling and the compact token codec.
///
/// Signature failures are intentionally opaque: no distinction is made
/// between a bad signature and a signature by the wrong key.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("signature invalid")]
    SignatureInvalid,

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("signing failed")]
    SigningFailed,

    #[error("invalid key")]
    InvalidKey,
}

pub type CoreResult<T> = Result<T, CoreError>;
