use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ed25519_dalek::{Signer as DalekSigner, SigningKey, VerifyingKey};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{CoreError, CoreResult};

// ---------------------------------------------------------------------------
// PublicKeyJwk — canonical public-key representation
// ---------------------------------------------------------------------------

/// Canonical JSON representation of an Ed25519 public key (OKP JWK).
///
/// This is the form in which public keys travel inside token payloads and
/// the form in which two keys are compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyJwk {
    pub kty: String,
    pub crv: String,
    /// Raw 32-byte public key, base64url without padding.
    pub x: String,
}

impl PublicKeyJwk {
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self {
            kty: "OKP".to_string(),
            crv: "Ed25519".to_string(),
            x: URL_SAFE_NO_PAD.encode(key.to_bytes()),
        }
    }

    /// Reconstruct the dalek verifying key. Fails with `InvalidKey` on any
    /// unexpected key type, curve, or point encoding.
    pub fn to_verifying_key(&self) -> CoreResult<VerifyingKey> {
        if self.kty != "OKP" || self.crv != "Ed25519" {
            return Err(CoreError::InvalidKey);
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(&self.x)
            .map_err(|_| CoreError::InvalidKey)?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| CoreError::InvalidKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| CoreError::InvalidKey)
    }
}

// ---------------------------------------------------------------------------
// SigningKeyPair — Ed25519 key pair with zeroized secret bytes
// ---------------------------------------------------------------------------

/// An Ed25519 key pair. The secret half is held in `Zeroizing` storage and
/// never appears in `Debug` output or serialized forms.
pub struct SigningKeyPair {
    secret: Zeroizing<[u8; 32]>,
    verifying: VerifyingKey,
}

impl SigningKeyPair {
    /// Generate a fresh key pair from the given CSPRNG.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut secret = Zeroizing::new([0u8; 32]);
        rng.fill_bytes(secret.as_mut());
        let signing_key = SigningKey::from_bytes(&secret);
        let verifying = signing_key.verifying_key();
        Self { secret, verifying }
    }

    /// Create a key pair from raw secret bytes (for testing).
    pub fn from_bytes(secret: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&secret);
        let verifying = signing_key.verifying_key();
        Self {
            secret: Zeroizing::new(secret),
            verifying,
        }
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let signing_key = SigningKey::from_bytes(&self.secret);
        signing_key.sign(message).to_bytes()
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying
    }

    /// Canonical public half of this key pair.
    pub fn public_jwk(&self) -> PublicKeyJwk {
        PublicKeyJwk::from_verifying_key(&self.verifying)
    }
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("secret", &"[REDACTED]")
            .field("public", &self.public_jwk().x)
            .finish()
    }
}
