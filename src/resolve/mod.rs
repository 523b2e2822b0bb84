//! Public-API resolution over the object graph.
//!
//! Two layers:
//! - `alias`: following re-export chains to their final targets, with
//!   cycle detection
//! - `api`: the reachability walk that computes the effectively-public
//!   object set and the path index used for display lookups

pub mod alias;
pub mod api;

pub use alias::final_target;
pub use api::PublicApi;
