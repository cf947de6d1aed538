//! Compact signed-token codec.
//!
//! A token is `header.payload.signature` with each segment base64url encoded,
//! padding stripped. The header carries only the algorithm identifier; the
//! payload is opaque bytes to this module. Signing and verification are pinned
//! to a caller-supplied algorithm identifier — a token whose header names a
//! different algorithm never reaches signature verification.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::keys::{PublicKeyJwk, SigningKeyPair};

/// The only signing algorithm this codec supports.
pub const EDDSA_ALG: &str = "EdDSA";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
}

/// Sign `payload` into a compact token with the given key and algorithm.
pub fn sign_compact(payload: &[u8], key: &SigningKeyPair, algorithm: &str) -> CoreResult<String> {
    if algorithm != EDDSA_ALG {
        return Err(CoreError::UnsupportedAlgorithm(algorithm.to_string()));
    }

    let header = Header {
        alg: algorithm.to_string(),
    };
    let header_json = serde_json::to_vec(&header).map_err(|_| CoreError::SigningFailed)?;
    let header_b64 = URL_SAFE_NO_PAD.encode(header_json);
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);

    let signing_input = format!("{}.{}", header_b64, payload_b64);
    let signature = key.sign(signing_input.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(signature);

    Ok(format!("{}.{}.{}", header_b64, payload_b64, sig_b64))
}

/// Verify a compact token's signature against `public_key` and return the
/// decoded payload bytes. The header algorithm must equal `algorithm`.
pub fn verify_compact(
    token: &str,
    public_key: &PublicKeyJwk,
    algorithm: &str,
) -> CoreResult<Vec<u8>> {
    let (header_b64, payload_b64, signature) = split_token(token)?;

    let header_json = decode_segment(header_b64, "header")?;
    let header: Header = serde_json::from_slice(&header_json)
        .map_err(|_| CoreError::MalformedToken("header is not valid JSON".into()))?;
    if header.alg != algorithm {
        return Err(CoreError::UnsupportedAlgorithm(header.alg));
    }

    let verifying_key = public_key.to_verifying_key()?;
    let signing_input = format!("{}.{}", header_b64, payload_b64);
    let signature = ed25519_dalek::Signature::from_bytes(&signature);
    verifying_key
        .verify_strict(signing_input.as_bytes(), &signature)
        .map_err(|_| CoreError::SignatureInvalid)?;

    decode_segment(payload_b64, "payload")
}

/// Decode a compact token's payload without checking its signature.
///
/// The token must still be structurally well formed (three segments, valid
/// base64url). Used for presentations whose signer is not bound to any known
/// key.
pub fn decode_payload(token: &str) -> CoreResult<Vec<u8>> {
    let (_, payload_b64, _) = split_token(token)?;
    decode_segment(payload_b64, "payload")
}

fn split_token(token: &str) -> CoreResult<(&str, &str, [u8; 64])> {
    let mut parts = token.split('.');
    let (header, payload, signature) = match (parts.next(), parts.next(), parts.next(), parts.next())
    {
        (Some(h), Some(p), Some(s), None) => (h, p, s),
        _ => {
            return Err(CoreError::MalformedToken(
                "expected 3 dot-separated segments".into(),
            ))
        }
    };
    let sig_bytes = decode_segment(signature, "signature")?;
    let sig_bytes: [u8; 64] = sig_bytes
        .try_into()
        .map_err(|_| CoreError::MalformedToken("signature is not 64 bytes".into()))?;
    Ok((header, payload, sig_bytes))
}

fn decode_segment(segment: &str, what: &str) -> CoreResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|_| CoreError::MalformedToken(format!("{} is not valid base64url", what)))
}
