//! Bisect Kernel: the pure data layer of the hierarchical bisection workspace.
//!
//! # API Surface
//!
//! - [`tree::CandidateNode`] -- the trait every searchable node implements
//! - [`tree::TreeNodeV1`] / [`tree::CandidateForestV1`] -- concrete forests
//! - [`proof::canon::canonical_json_bytes`] -- the single canonical JSON writer
//! - [`proof::hash::canonical_hash`] -- domain-separated SHA-256
//!
//! # Module Dependency Direction
//!
//! `proof` ← `tree`
//!
//! One-way only. `tree` uses `proof` to digest forests; `proof` depends on
//! nothing internal.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod proof;
pub mod tree;
