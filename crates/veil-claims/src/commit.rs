//! Salt generation and salted-hash commitments.
//!
//! A commitment is `base64url(SHA-256(canonical JSON "[salt, value]"))` with
//! padding stripped. The raw `[salt, value]` text is the disclosure entry: the
//! pre-image the holder reveals to open the commitment. Salts are 128 bits
//! from a caller-supplied CSPRNG and are never reused across issuances —
//! identical claim values must not produce correlatable commitments.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{ClaimsError, ClaimsResult};

/// Salt length in bytes (128 bits of entropy).
pub const SALT_LEN: usize = 16;

/// Generate a fresh salt: 16 random bytes, base64url without padding.
pub fn generate_salt<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    let mut bytes = [0u8; SALT_LEN];
    rng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 over raw bytes, base64url without padding.
fn hash_raw(raw: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(raw))
}

/// The canonical disclosure text for `(salt, value)`: the JSON array
/// `[salt, value]` in compact serialization. This is the commitment pre-image.
pub fn disclosure_raw(salt: &str, value: &serde_json::Value) -> ClaimsResult<String> {
    let entry = serde_json::json!([salt, value]);
    serde_json::to_string(&entry).map_err(|_| ClaimsError::EncodingFailed)
}

/// Compute the commitment for `(salt, value)`.
pub fn commitment(salt: &str, value: &serde_json::Value) -> ClaimsResult<String> {
    Ok(hash_raw(disclosure_raw(salt, value)?.as_bytes()))
}

/// Check a disclosed raw entry against its expected commitment and extract
/// the disclosed value.
///
/// The digest comparison is constant-time. On a match the raw text must parse
/// as a 2-element array `[salt, value]`; element 1 is returned. `claim` is
/// only used to name the failing claim in errors.
pub fn open_disclosure(
    claim: &str,
    raw: &str,
    expected_commitment: &str,
) -> ClaimsResult<serde_json::Value> {
    let recomputed = hash_raw(raw.as_bytes());
    let matches: bool = recomputed
        .as_bytes()
        .ct_eq(expected_commitment.as_bytes())
        .into();
    if !matches {
        return Err(ClaimsError::CommitmentMismatch(claim.to_string()));
    }

    let decoded: serde_json::Value =
        serde_json::from_str(raw).map_err(|_| ClaimsError::MalformedDisclosure(claim.to_string()))?;
    match decoded.as_array() {
        Some(entry) if entry.len() == 2 => Ok(entry[1].clone()),
        _ => Err(ClaimsError::MalformedDisclosure(claim.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_salt_is_unpadded_base64url() {
        let mut rng = StdRng::seed_from_u64(1);
        let salt = generate_salt(&mut rng);
        assert!(!salt.contains('='));
        let bytes = URL_SAFE_NO_PAD.decode(&salt).unwrap();
        assert_eq!(bytes.len(), SALT_LEN);
    }

    #[test]
    fn test_salts_unique() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generate_salt(&mut rng)), "salt repeated");
        }
    }

    #[test]
    fn test_commitment_deterministic_for_same_inputs() {
        let c1 = commitment("salt", &json!("value")).unwrap();
        let c2 = commitment("salt", &json!("value")).unwrap();
        assert_eq!(c1, c2);
    }

    #[test]
    fn test_commitment_differs_by_salt() {
        let c1 = commitment("salt-a", &json!("value")).unwrap();
        let c2 = commitment("salt-b", &json!("value")).unwrap();
        assert_ne!(c1, c2);
    }

    #[test]
    fn test_no_collisions_across_salts() {
        // Equal values under distinct salts must yield distinct commitments
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let salt = generate_salt(&mut rng);
            let c = commitment(&salt, &json!("same-value")).unwrap();
            assert!(seen.insert(c), "commitment collision");
        }
    }

    #[test]
    fn test_raw_is_two_element_array() {
        let raw = disclosure_raw("s", &json!({"n": 1})).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, json!(["s", {"n": 1}]));
    }

    #[test]
    fn test_open_disclosure_returns_value() {
        let raw = disclosure_raw("s", &json!("Berlin")).unwrap();
        let c = commitment("s", &json!("Berlin")).unwrap();
        let value = open_disclosure("city", &raw, &c).unwrap();
        assert_eq!(value, json!("Berlin"));
    }

    #[test]
    fn test_open_disclosure_rejects_single_char_tamper() {
        let raw = disclosure_raw("s", &json!("Berlin")).unwrap();
        let c = commitment("s", &json!("Berlin")).unwrap();
        let tampered = raw.replacen("Berlin", "Berlim", 1);
        let err = open_disclosure("city", &tampered, &c).unwrap_err();
        assert!(matches!(err, ClaimsError::CommitmentMismatch(claim) if claim == "city"));
    }

    #[test]
    fn test_open_disclosure_rejects_wrong_commitment() {
        let raw = disclosure_raw("s", &json!("Berlin")).unwrap();
        let other = commitment("s", &json!("Munich")).unwrap();
        assert!(open_disclosure("city", &raw, &other).is_err());
    }

    #[test]
    fn test_open_disclosure_rejects_non_array_preimage() {
        // A raw entry whose hash matches but whose body is not [salt, value]
        let raw = "\"just-a-string\"";
        let c = hash_raw(raw.as_bytes());
        let err = open_disclosure("city", raw, &c).unwrap_err();
        assert!(matches!(err, ClaimsError::MalformedDisclosure(_)));
    }

    #[test]
    fn test_open_disclosure_rejects_wrong_arity() {
        let raw = "[\"salt\",\"value\",\"extra\"]";
        let c = hash_raw(raw.as_bytes());
        let err = open_disclosure("city", raw, &c).unwrap_err();
        assert!(matches!(err, ClaimsError::MalformedDisclosure(_)));
    }

    #[test]
    fn test_commitment_is_unpadded_base64url() {
        let c = commitment("s", &json!(42)).unwrap();
        assert!(!c.contains('='));
        assert_eq!(URL_SAFE_NO_PAD.decode(&c).unwrap().len(), 32);
    }
}
