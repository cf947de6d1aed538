//! Veil core collaborators: key handles and the compact signed-token codec.
//!
//! The disclosure engine in `veil-claims` treats signing and key handling as
//! external concerns. This crate supplies both: Ed25519 key pairs with a
//! canonical public-key JSON representation, and a three-segment compact
//! token format (`header.payload.signature`, each segment base64url without
//! padding) signed and verified against a fixed algorithm identifier.

pub mod error;
pub mod keys;
pub mod token;

pub use error::{CoreError, CoreResult};
pub use keys::{PublicKeyJwk, SigningKeyPair};
pub use token::{decode_payload, sign_compact, verify_compact, EDDSA_ALG};
