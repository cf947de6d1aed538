//! Issuance: commit to a claim tree and produce the holder's disclosure
//! material.
//!
//! Issuance walks the claim tree three times with one salt tree: once to
//! generate fresh salts, once to build the commitment tree that goes into the
//! signed token, and once to build the raw disclosure entries the holder
//! keeps. Salts live only inside the disclosure container — the signed token
//! carries nothing that reveals a claim value.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{CryptoRng, RngCore};

use veil_core::{sign_compact, PublicKeyJwk, SigningKeyPair};

use crate::commit::{commitment, disclosure_raw, generate_salt};
use crate::error::{ClaimsError, ClaimsResult};
use crate::tree::{pair_by_structure, ClaimTree, SaltTree};
use crate::types::{Issuance, ProtocolConfig};

/// Issue a commitment token and disclosure container over `user_claims`.
///
/// `claim_structure` only distinguishes nested branches from leaves; it may be
/// empty (all top-level keys treated as leaves unless the claims themselves
/// nest). `issued_at`/`expires_at` are unix seconds; expiry defaults to
/// `issued_at + config.default_expiry_secs`.
#[allow(clippy::too_many_arguments)]
pub fn issue<R: RngCore + CryptoRng>(
    config: &ProtocolConfig,
    rng: &mut R,
    user_claims: &ClaimTree,
    issuer: &str,
    issuer_key: &SigningKeyPair,
    holder_public_key: &PublicKeyJwk,
    claim_structure: &ClaimTree,
    issued_at: Option<i64>,
    expires_at: Option<i64>,
) -> ClaimsResult<Issuance> {
    let salts: SaltTree =
        pair_by_structure(claim_structure, user_claims, &mut |_, _, _| {
            Ok(generate_salt(rng))
        })?;

    let commitments = pair_by_structure(&salts, user_claims, &mut |key, value, salt| {
        let salt = salt.ok_or_else(|| ClaimsError::StructureMismatch(key.to_string()))?;
        commitment(salt, value)
    })?;

    let iat = issued_at.unwrap_or_else(|| chrono::Utc::now().timestamp());
    let exp = expires_at.unwrap_or(iat + config.default_expiry_secs as i64);

    let mut payload = serde_json::Map::new();
    payload.insert("iss".into(), serde_json::Value::String(issuer.to_string()));
    payload.insert(
        "sub_jwk".into(),
        serde_json::to_value(holder_public_key).map_err(|_| ClaimsError::EncodingFailed)?,
    );
    payload.insert("iat".into(), serde_json::Value::from(iat));
    payload.insert("exp".into(), serde_json::Value::from(exp));
    payload.insert(
        config.claims_key.clone(),
        serde_json::to_value(&commitments).map_err(|_| ClaimsError::EncodingFailed)?,
    );
    let payload_bytes =
        serde_json::to_vec(&payload).map_err(|_| ClaimsError::EncodingFailed)?;
    let token = sign_compact(&payload_bytes, issuer_key, &config.algorithm)?;

    let disclosures = pair_by_structure(&salts, user_claims, &mut |key, value, salt| {
        let salt = salt.ok_or_else(|| ClaimsError::StructureMismatch(key.to_string()))?;
        disclosure_raw(salt, value)
    })?;
    let mut container = serde_json::Map::new();
    container.insert(
        config.claims_key.clone(),
        serde_json::to_value(&disclosures).map_err(|_| ClaimsError::EncodingFailed)?,
    );
    let container_bytes =
        serde_json::to_vec(&container).map_err(|_| ClaimsError::EncodingFailed)?;

    Ok(Issuance {
        token,
        disclosure_container: URL_SAFE_NO_PAD.encode(container_bytes),
    })
}
