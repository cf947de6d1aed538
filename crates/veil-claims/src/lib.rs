//! Veil selective disclosure engine.
//!
//! An issuer commits to a nested tree of user claims with per-leaf salted
//! hashes and signs the commitments; the holder keeps the unsigned pre-images
//! and later releases any subset of them under its own signature; a verifier
//! re-derives the commitments from what was released and learns exactly those
//! claims, nothing else.
//!
//! # Protocol roles
//!
//! ```text
//! issue  -> (commitment token, disclosure container)   [issuer]
//! release-> release token over a chosen claim subset   [holder]
//! verify -> disclosed claim tree                       [verifier]
//! ```
//!
//! All three operations are pure, synchronous functions over immutable
//! inputs; the only stateful input is the CSPRNG handed to issuance.

pub mod commit;
pub mod error;
pub mod issue;
pub mod release;
pub mod tree;
pub mod types;
pub mod verify;

pub use error::{ClaimsError, ClaimsResult};
pub use tree::{pair_by_structure, ClaimTree, CommitmentTree, DisclosureTree, SaltTree, Tree};
pub use types::{combine_presentation, Issuance, ProtocolConfig};

use rand::{CryptoRng, RngCore};
use veil_core::{PublicKeyJwk, SigningKeyPair};

/// The three protocol operations bundled with one configuration.
///
/// Construction validates the configuration once; every subsequent call is a
/// thin wrapper over the free functions in [`issue`], [`release`], and
/// [`verify`].
#[derive(Debug)]
pub struct DisclosureEngine {
    config: ProtocolConfig,
}

impl DisclosureEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: ProtocolConfig) -> ClaimsResult<Self> {
        config
            .validate()
            .map_err(ClaimsError::InvalidArguments)?;
        Ok(Self { config })
    }

    /// Create an engine with default configuration.
    pub fn default_engine() -> Self {
        Self {
            config: ProtocolConfig::default(),
        }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Issuer role: commit to `user_claims` and produce the holder's
    /// disclosure material.
    #[allow(clippy::too_many_arguments)]
    pub fn issue<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        user_claims: &ClaimTree,
        issuer: &str,
        issuer_key: &SigningKeyPair,
        holder_public_key: &PublicKeyJwk,
        claim_structure: &ClaimTree,
        issued_at: Option<i64>,
        expires_at: Option<i64>,
    ) -> ClaimsResult<Issuance> {
        issue::issue(
            &self.config,
            rng,
            user_claims,
            issuer,
            issuer_key,
            holder_public_key,
            claim_structure,
            issued_at,
            expires_at,
        )
    }

    /// Holder role: release the chosen subset under a verifier's nonce and
    /// audience.
    pub fn release(
        &self,
        nonce: &str,
        audience: &str,
        chosen_claims: &ClaimTree,
        disclosure_container: &str,
        holder_key: &SigningKeyPair,
    ) -> ClaimsResult<String> {
        release::release(
            &self.config,
            nonce,
            audience,
            chosen_claims,
            disclosure_container,
            holder_key,
        )
    }

    /// Verifier role: check a combined presentation and recover the
    /// disclosed claims.
    #[allow(clippy::too_many_arguments)]
    pub fn verify(
        &self,
        combined_presentation: &str,
        issuer_public_key: &PublicKeyJwk,
        expected_issuer: &str,
        holder_public_key: Option<&PublicKeyJwk>,
        expected_audience: Option<&str>,
        expected_nonce: Option<&str>,
    ) -> ClaimsResult<ClaimTree> {
        verify::verify(
            &self.config,
            combined_presentation,
            issuer_public_key,
            expected_issuer,
            holder_public_key,
            expected_audience,
            expected_nonce,
        )
    }
}
