use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ProtocolConfig — externally supplied constants for the engine
// ---------------------------------------------------------------------------

/// Payload field names the claims key must not collide with.
const RESERVED_PAYLOAD_KEYS: &[&str] = &["iss", "sub_jwk", "iat", "exp", "nonce", "aud"];

/// Configuration for the disclosure engine. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Signing algorithm identifier passed to the token codec.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Payload field under which commitment/disclosure trees travel.
    #[serde(default = "default_claims_key")]
    pub claims_key: String,

    /// Default token lifetime when issuance is given no explicit expiry.
    #[serde(default = "default_expiry_secs")]
    pub default_expiry_secs: u64,
}

fn default_algorithm() -> String {
    veil_core::EDDSA_ALG.to_string()
}

fn default_claims_key() -> String {
    "sd_claims".to_string()
}

fn default_expiry_secs() -> u64 {
    15 * 60
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            claims_key: default_claims_key(),
            default_expiry_secs: default_expiry_secs(),
        }
    }
}

impl ProtocolConfig {
    /// Validate configuration constraints.
    pub fn validate(&self) -> Result<(), String> {
        if self.algorithm.is_empty() {
            return Err("algorithm must not be empty".into());
        }
        if self.claims_key.is_empty() {
            return Err("claims_key must not be empty".into());
        }
        if RESERVED_PAYLOAD_KEYS.contains(&self.claims_key.as_str()) {
            return Err(format!(
                "claims_key '{}' collides with a reserved payload field",
                self.claims_key
            ));
        }
        if self.default_expiry_secs == 0 {
            return Err("default_expiry_secs must be positive".into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Issuance — what the issuer hands back
// ---------------------------------------------------------------------------

/// Result of issuance: the signed commitment token goes to the holder along
/// with the unsigned disclosure container. Only the holder ever reads the
/// container; the verifier sees releases derived from it, never the container
/// itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issuance {
    /// Issuer-signed compact token carrying the commitment tree.
    pub token: String,
    /// base64url-encoded `{<claims_key>: DisclosureTree}`, unsigned.
    pub disclosure_container: String,
}

/// Concatenate the issuer token and a release token into the combined
/// presentation the verifier consumes (six dot-separated segments).
pub fn combine_presentation(sd_token: &str, release_token: &str) -> String {
    format!("{}.{}", sd_token, release_token)
}
