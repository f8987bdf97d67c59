//! Bisect Harness: drives the bisector against an oracle.
//!
//! The harness reads a requirements manifest into a candidate forest, feeds
//! candidates to an [`contract::Oracle`], and packages the confirmed
//! culprits with the full transition log as an auditable report.
//! [`resolve`] feeds resolver conflicts back into the unpinned set.
//!
//! The harness does NOT implement traversal logic; it delegates to
//! `bisect_search`. Oracles provide verdicts only; the harness owns retry,
//! budgets and culprit bookkeeping.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod contract;
pub mod manifest;
pub mod oracle;
pub mod policy;
pub mod report;
pub mod resolve;
pub mod runner;
