//! Proof module: canonical JSON and domain-separated content hashing.
//!
//! Nothing in `proof` depends on `tree`.

pub mod canon;
pub mod hash;
pub mod hash_domain;
