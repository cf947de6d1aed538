use thiserror::Error;

use veil_core::CoreError;

/// Error type for the disclosure engine.
///
/// Every failure is terminal for the operation that raised it: issuance,
/// release, and verification never retry internally and never return partial
/// results. Cryptographic failures stay opaque — a commitment mismatch names
/// the claim, never the values involved.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClaimsError {
    #[error("structure mismatch at claim '{0}'")]
    StructureMismatch(String),

    #[error("malformed presentation: {0}")]
    MalformedPresentation(String),

    #[error("malformed disclosure for claim '{0}'")]
    MalformedDisclosure(String),

    #[error("malformed disclosure container: {0}")]
    MalformedContainer(String),

    #[error("commitment mismatch for claim '{0}'")]
    CommitmentMismatch(String),

    #[error("invalid issuer: {0}")]
    InvalidIssuer(String),

    #[error("invalid audience")]
    InvalidAudience,

    #[error("invalid nonce")]
    InvalidNonce,

    #[error("holder key does not match the key bound at issuance")]
    HolderKeyMismatch,

    #[error("no disclosure claims present")]
    MissingCommitments,

    #[error("signature invalid")]
    SignatureInvalid,

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("token expired")]
    TokenExpired,

    #[error("signing failed")]
    SigningFailed,

    #[error("encoding failed")]
    EncodingFailed,
}

impl From<CoreError> for ClaimsError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SignatureInvalid => ClaimsError::SignatureInvalid,
            CoreError::MalformedToken(msg) => ClaimsError::MalformedPresentation(msg),
            CoreError::UnsupportedAlgorithm(alg) => {
                ClaimsError::InvalidArguments(format!("unsupported algorithm '{}'", alg))
            }
            CoreError::SigningFailed => ClaimsError::SigningFailed,
            CoreError::InvalidKey => ClaimsError::InvalidArguments("invalid key".into()),
        }
    }
}

pub type ClaimsResult<T> = Result<T, ClaimsError>;
