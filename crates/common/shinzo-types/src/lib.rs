//! Shared data shapes used across the Shinzo app SDK workspace.

pub mod attestation;
pub mod document;
pub mod peer;
pub mod version;

pub use attestation::AttestationRecord;
pub use document::{Document, DOC_ID_FIELD};
pub use peer::PeerInfo;
pub use version::{Signature, Version};
