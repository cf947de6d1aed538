//! Verification: check a combined presentation and recover disclosed claims.
//!
//! Verification is staged: structural (segment count, payload shapes),
//! cryptographic (issuer signature, optional holder signature), semantic
//! (issuer identity, expiry, audience, nonce, holder binding), and finally the
//! re-derivation walk that hashes every disclosed raw entry against the
//! issuer's commitment at the same path. Any failure aborts the whole check;
//! there is no partial-claim acceptance.

use veil_core::{decode_payload, verify_compact, PublicKeyJwk};

use crate::commit::open_disclosure;
use crate::error::{ClaimsError, ClaimsResult};
use crate::tree::{pair_by_structure, ClaimTree, CommitmentTree, DisclosureTree};
use crate::types::ProtocolConfig;

/// Tolerated forward clock skew when checking `iat`.
const IAT_SKEW_SECS: i64 = 60;

/// Verify a combined presentation and return the disclosed claim tree.
///
/// With `holder_public_key` supplied, `expected_audience` and
/// `expected_nonce` are mandatory and the release token is checked against
/// the holder key bound at issuance. Without it the release token is only
/// structurally parsed — an anonymous presentation — and audience/nonce go
/// unchecked.
pub fn verify(
    config: &ProtocolConfig,
    combined_presentation: &str,
    issuer_public_key: &PublicKeyJwk,
    expected_issuer: &str,
    holder_public_key: Option<&PublicKeyJwk>,
    expected_audience: Option<&str>,
    expected_nonce: Option<&str>,
) -> ClaimsResult<ClaimTree> {
    tracing::debug!(
        issuer = expected_issuer,
        bound = holder_public_key.is_some(),
        "verifying combined presentation"
    );

    if holder_public_key.is_some() && (expected_audience.is_none() || expected_nonce.is_none()) {
        return Err(ClaimsError::InvalidArguments(
            "holder binding requires both audience and nonce".into(),
        ));
    }

    let parts: Vec<&str> = combined_presentation.split('.').collect();
    if parts.len() != 6 {
        tracing::warn!(segments = parts.len(), "presentation rejected: bad segment count");
        return Err(ClaimsError::MalformedPresentation(format!(
            "expected 6 dot-separated segments, got {}",
            parts.len()
        )));
    }

    let sd_token = parts[..3].join(".");
    let (commitments, embedded_holder_key) =
        check_issuer_token(config, &sd_token, issuer_public_key, expected_issuer)?;

    let release_token = parts[3..].join(".");
    let released = check_release_token(
        config,
        &release_token,
        holder_public_key,
        embedded_holder_key,
        expected_audience,
        expected_nonce,
    )?;

    let disclosed = pair_by_structure(&commitments, &released, &mut |key, raw, expected| {
        let expected =
            expected.ok_or_else(|| ClaimsError::StructureMismatch(key.to_string()))?;
        open_disclosure(key, raw, expected)
    })?;

    tracing::info!(claims = disclosed.len(), "presentation verified");
    Ok(disclosed)
}

/// Verify the issuer-signed token: signature, issuer identity, expiry, and
/// commitment tree. Returns the commitments and any holder key embedded at
/// issuance.
fn check_issuer_token(
    config: &ProtocolConfig,
    token: &str,
    issuer_public_key: &PublicKeyJwk,
    expected_issuer: &str,
) -> ClaimsResult<(CommitmentTree, Option<PublicKeyJwk>)> {
    let payload = verify_compact(token, issuer_public_key, &config.algorithm)?;
    let mut payload: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&payload).map_err(|_| {
            ClaimsError::MalformedPresentation("issuer payload is not a JSON object".into())
        })?;

    match payload.get("iss").and_then(|v| v.as_str()) {
        Some(iss) if iss == expected_issuer => {}
        Some(iss) => {
            tracing::warn!(issuer = iss, "presentation rejected: issuer mismatch");
            return Err(ClaimsError::InvalidIssuer(iss.to_string()));
        }
        None => return Err(ClaimsError::InvalidIssuer("missing".into())),
    }

    let now = chrono::Utc::now().timestamp();
    if let Some(exp) = payload.get("exp").and_then(|v| v.as_i64()) {
        if exp <= now {
            tracing::warn!(exp, "presentation rejected: issuer token expired");
            return Err(ClaimsError::TokenExpired);
        }
    }
    if let Some(iat) = payload.get("iat").and_then(|v| v.as_i64()) {
        if iat > now + IAT_SKEW_SECS {
            tracing::warn!(iat, "presentation rejected: issued in the future");
            return Err(ClaimsError::TokenExpired);
        }
    }

    let embedded_holder_key = match payload.remove("sub_jwk") {
        Some(value) => Some(serde_json::from_value(value).map_err(|_| {
            ClaimsError::MalformedPresentation("embedded holder key is not a valid JWK".into())
        })?),
        None => None,
    };

    let commitments = payload
        .remove(&config.claims_key)
        .ok_or(ClaimsError::MissingCommitments)?;
    let commitments: CommitmentTree = serde_json::from_value(commitments).map_err(|_| {
        ClaimsError::MalformedPresentation("commitments are not a claim tree".into())
    })?;

    Ok((commitments, embedded_holder_key))
}

/// Verify the holder-signed release token and extract the released raw
/// entries. Holder binding, audience, and nonce are only checked when a
/// holder key is supplied.
fn check_release_token(
    config: &ProtocolConfig,
    token: &str,
    holder_public_key: Option<&PublicKeyJwk>,
    embedded_holder_key: Option<PublicKeyJwk>,
    expected_audience: Option<&str>,
    expected_nonce: Option<&str>,
) -> ClaimsResult<DisclosureTree> {
    let payload = match holder_public_key {
        Some(holder_key) => {
            match embedded_holder_key {
                Some(embedded) if embedded == *holder_key => {}
                Some(_) => {
                    tracing::warn!("presentation rejected: holder key mismatch");
                    return Err(ClaimsError::HolderKeyMismatch);
                }
                None => return Err(ClaimsError::HolderKeyMismatch),
            }
            verify_compact(token, holder_key, &config.algorithm)?
        }
        None => decode_payload(token)?,
    };

    let mut payload: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&payload).map_err(|_| {
            ClaimsError::MalformedPresentation("release payload is not a JSON object".into())
        })?;

    if holder_public_key.is_some() {
        // Mandatory Some by the argument check in `verify`
        let audience = expected_audience.unwrap_or_default();
        let nonce = expected_nonce.unwrap_or_default();
        if payload.get("aud").and_then(|v| v.as_str()) != Some(audience) {
            tracing::warn!("presentation rejected: audience mismatch");
            return Err(ClaimsError::InvalidAudience);
        }
        if payload.get("nonce").and_then(|v| v.as_str()) != Some(nonce) {
            tracing::warn!("presentation rejected: nonce mismatch");
            return Err(ClaimsError::InvalidNonce);
        }
    }

    let released = payload
        .remove(&config.claims_key)
        .ok_or(ClaimsError::MissingCommitments)?;
    serde_json::from_value(released).map_err(|_| {
        ClaimsError::MalformedPresentation("released entries are not a claim tree".into())
    })
}
