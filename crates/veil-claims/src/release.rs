//! Release: build a holder-signed token disclosing a chosen claim subset.
//!
//! The holder never re-serializes claim values. The release tree is pulled
//! verbatim from the raw entries stored in the disclosure container, so the
//! text the verifier hashes is byte-identical to what the issuer committed to.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

use veil_core::{sign_compact, SigningKeyPair};

use crate::error::{ClaimsError, ClaimsResult};
use crate::tree::{pair_by_structure, ClaimTree, DisclosureTree};
use crate::types::ProtocolConfig;

/// Build a signed release token over the claims selected in `chosen_claims`.
///
/// `chosen_claims` selects by key and nesting only; its leaf values are
/// placeholders and never reach the output. A chosen claim with no stored
/// disclosure entry fails with [`ClaimsError::StructureMismatch`].
pub fn release(
    config: &ProtocolConfig,
    nonce: &str,
    audience: &str,
    chosen_claims: &ClaimTree,
    disclosure_container: &str,
    holder_key: &SigningKeyPair,
) -> ClaimsResult<String> {
    let disclosures = decode_container(config, disclosure_container)?;

    let released = pair_by_structure(&disclosures, chosen_claims, &mut |key, _, raw| {
        raw.cloned()
            .ok_or_else(|| ClaimsError::StructureMismatch(key.to_string()))
    })?;

    let mut payload = serde_json::Map::new();
    payload.insert("nonce".into(), serde_json::Value::String(nonce.to_string()));
    payload.insert("aud".into(), serde_json::Value::String(audience.to_string()));
    payload.insert(
        config.claims_key.clone(),
        serde_json::to_value(&released).map_err(|_| ClaimsError::EncodingFailed)?,
    );
    let payload_bytes =
        serde_json::to_vec(&payload).map_err(|_| ClaimsError::EncodingFailed)?;

    Ok(sign_compact(&payload_bytes, holder_key, &config.algorithm)?)
}

/// Decode a disclosure container back into its raw-entry tree. Tolerates
/// base64 padding some encoders re-add.
fn decode_container(
    config: &ProtocolConfig,
    container: &str,
) -> ClaimsResult<DisclosureTree> {
    let bytes = URL_SAFE_NO_PAD
        .decode(container.trim_end_matches('='))
        .map_err(|_| ClaimsError::MalformedContainer("not valid base64url".into()))?;
    let mut parsed: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&bytes)
            .map_err(|_| ClaimsError::MalformedContainer("not a JSON object".into()))?;
    let claims = parsed
        .remove(&config.claims_key)
        .ok_or(ClaimsError::MissingCommitments)?;
    serde_json::from_value(claims).map_err(|_| {
        ClaimsError::MalformedContainer("disclosure entries are not a claim tree".into())
    })
}
