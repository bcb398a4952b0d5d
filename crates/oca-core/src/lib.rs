//! oca-core
//!
//! Core primitives for securing OCA bundles:
//! - Canonical JSON encoding (RFC 8785) for deterministic hashing
//! - Self-addressing identifier (SAID) derivation
//! - Bundle securing: capture base digest, overlay chaining and sealing
//! - Verification, overlay lookup and bundle drafting helpers
//!
//! The crate performs no file or network I/O.

pub mod bundle;
pub mod canonical;
pub mod config;
pub mod draft;
pub mod errors;
pub mod hash;
pub mod model;
pub mod said;
pub mod secure;
pub mod verify;

pub use crate::errors::{OcaError, OcaResult};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::bundle::{find_overlay, SecuredBundle, UnsecuredBundle};
    pub use crate::canonical::{canonical_json_bytes, canonicalize, CanonicalJsonOptions};
    pub use crate::config::{CoreConfig, LimitsConfig, PrefixPolicy, SaidConfig};
    pub use crate::draft::{draft_bundle, DraftSchema};
    pub use crate::hash::DigestAlgorithm;
    pub use crate::model::{fields, types, Record};
    pub use crate::said::{placeholder, Said, SaidEngine, SAID_LEN};
    pub use crate::secure::{secure, BundleSecurer};
    pub use crate::verify::{verify_bundle, VerifyReport};
    pub use crate::{OcaError, OcaResult};
}
