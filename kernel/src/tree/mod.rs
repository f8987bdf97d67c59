//! Tree module: the abstract candidate model the bisector walks.
//!
//! A forest is an ordered sequence of root nodes. A node exposes an identity
//! and an ordered, possibly empty sequence of children. Nothing else.

pub mod forest;
pub mod node;

pub use forest::{
    CandidateForestV1, ForestBuilder, ForestError, NodeRef, CANDIDATE_FOREST_SCHEMA_VERSION,
};
pub use node::{forest_digest, forest_to_json, leaf_ids, CandidateNode, TreeNodeV1};
