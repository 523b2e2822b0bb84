//! Alias (re-export) resolution.
//!
//! An alias node carries the dotted path of whatever it re-exports. The
//! target may itself be an alias, so resolution follows the chain until a
//! concrete node is reached. Two failure modes: the chain names a path the
//! graph does not contain, or it loops back on itself.

use std::collections::HashSet;

use crate::error::AliasError;
use crate::types::{NodeId, ObjectGraph};

/// Follow alias links from `id` until a non-alias node is reached.
///
/// Returns `id` unchanged when the node is not an alias.
pub fn final_target(graph: &ObjectGraph, id: NodeId) -> Result<NodeId, AliasError> {
    let mut current = id;
    let mut visited: HashSet<NodeId> = HashSet::new();
    visited.insert(current);

    while let Some(target_path) = graph.node(current).alias_target.as_deref() {
        let next = graph
            .by_path(target_path)
            .ok_or_else(|| AliasError::Unresolved(target_path.to_string()))?;
        if !visited.insert(next) {
            return Err(AliasError::Cycle(graph.node(id).path.clone()));
        }
        current = next;
    }

    Ok(current)
}
