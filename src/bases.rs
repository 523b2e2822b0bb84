//! Flattened base-class collection for public classes.
//!
//! A class's declared bases may be private implementation detail. The docs
//! should say what a class inherits from in public terms, so any base that
//! is not itself public is replaced by *its* bases, recursively. Output is
//! an ordered display-name -> autoref mapping; declaration order is kept
//! and the first occurrence of a name wins.

use std::collections::HashSet;

use crate::error::ApiLookupError;
use crate::resolve::alias::final_target;
use crate::resolve::PublicApi;
use crate::types::{NodeId, ObjectGraph};

/// A declared base after resolution: a builtin type by bare name, or a
/// concrete node in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ResolvedBase {
    Builtin(String),
    Object(NodeId),
}

/// A base path like `builtins.int` resolves to the bare builtin name.
fn builtin_base_name(path: &str) -> Option<&str> {
    let rest = path.strip_prefix("builtins.")?;
    let valid = !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(rest)
}

/// Resolve a class's declared bases, silently dropping any that cannot be
/// resolved (dangling paths, unresolvable or cyclic aliases).
fn resolved_bases(graph: &ObjectGraph, class: NodeId) -> Vec<ResolvedBase> {
    let mut resolved = Vec::new();
    for base_path in &graph.node(class).bases {
        if let Some(name) = builtin_base_name(base_path) {
            resolved.push(ResolvedBase::Builtin(name.to_string()));
        } else if let Some(id) = graph.by_path(base_path) {
            if let Ok(target) = final_target(graph, id) {
                resolved.push(ResolvedBase::Object(target));
            }
        }
    }
    resolved
}

/// Collect the displayed bases of a public class.
///
/// Builtin bases appear (without autoref) only when `"builtins"` is among
/// the trusted public modules. A base in the public API appears under its
/// canonical path; a base that is not public is flattened into its own
/// bases. Ambiguous lookups propagate - everything else about a base that
/// cannot be displayed is dropped.
pub fn collect_bases(
    graph: &ObjectGraph,
    class: NodeId,
    api: &PublicApi,
    public_modules: &[String],
) -> Result<Vec<(String, bool)>, ApiLookupError> {
    let mut bases = Vec::new();
    let mut visiting = HashSet::new();
    collect_into(graph, class, api, public_modules, &mut bases, &mut visiting)?;
    Ok(bases)
}

fn collect_into(
    graph: &ObjectGraph,
    class: NodeId,
    api: &PublicApi,
    public_modules: &[String],
    out: &mut Vec<(String, bool)>,
    visiting: &mut HashSet<NodeId>,
) -> Result<(), ApiLookupError> {
    if !visiting.insert(class) {
        // Inheritance cycle in the input graph; nothing sensible to add.
        return Ok(());
    }
    for base in resolved_bases(graph, class) {
        match base {
            ResolvedBase::Builtin(name) => {
                if public_modules.iter().any(|m| m == "builtins") {
                    insert_first_wins(out, name, false);
                }
            }
            ResolvedBase::Object(id) if graph.node(id).kind.is_class() => {
                match api.lookup(&graph.node(id).path) {
                    Ok((display, autoref)) => insert_first_wins(out, display, autoref),
                    Err(err) if err.is_recoverable() => {
                        collect_into(graph, id, api, public_modules, out, visiting)?;
                    }
                    Err(err) => return Err(err),
                }
            }
            // Resolved to something that is not a class; not displayable.
            ResolvedBase::Object(_) => {}
        }
    }
    Ok(())
}

fn insert_first_wins(out: &mut Vec<(String, bool)>, key: String, value: bool) {
    if !out.iter().any(|(k, _)| *k == key) {
        out.push((key, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::GraphBuilder;

    fn api_for(graph: &ObjectGraph, roots: &[&str]) -> PublicApi {
        let config = Config {
            top_level_public_api: roots.iter().map(|s| s.to_string()).collect(),
            ..Config::default()
        };
        PublicApi::build(graph, &config)
    }

    #[test]
    fn test_private_intermediate_base_flattened() {
        let mut b = GraphBuilder::package("pkg");
        let root = b.root();
        let pub_base = b.class(root, "Pub");
        let mid = b.class(root, "_Mid");
        b.set_bases(mid, &["pkg.Pub"]);
        let leaf = b.class(root, "Leaf");
        b.set_bases(leaf, &["pkg._Mid"]);
        let _ = pub_base;
        let graph = b.build();

        let api = api_for(&graph, &["pkg.Pub", "pkg.Leaf"]);
        let bases = collect_bases(&graph, leaf, &api, &[]).unwrap();

        // _Mid is not public, so Leaf reports Pub, not _Mid.
        assert_eq!(bases, vec![("pkg.Pub".to_string(), true)]);
    }

    #[test]
    fn test_builtin_base_gated_on_trusted_builtins() {
        let mut b = GraphBuilder::package("pkg");
        let root = b.root();
        let class = b.class(root, "Flag");
        b.set_bases(class, &["builtins.int"]);
        let graph = b.build();
        let api = api_for(&graph, &["pkg.Flag"]);

        let without = collect_bases(&graph, class, &api, &[]).unwrap();
        assert!(without.is_empty());

        let with = collect_bases(&graph, class, &api, &["builtins".to_string()]).unwrap();
        assert_eq!(with, vec![("int".to_string(), false)]);
    }

    #[test]
    fn test_unresolvable_base_dropped() {
        let mut b = GraphBuilder::package("pkg");
        let root = b.root();
        let class = b.class(root, "Leaf");
        b.set_bases(class, &["pkg.does.NotExist"]);
        let graph = b.build();
        let api = api_for(&graph, &["pkg.Leaf"]);

        let bases = collect_bases(&graph, class, &api, &[]).unwrap();
        assert!(bases.is_empty());
    }

    #[test]
    fn test_base_through_alias_uses_canonical_display() {
        let mut b = GraphBuilder::package("pkg");
        let root = b.root();
        let sub = b.module(root, "_impl");
        b.class(sub, "Base");
        b.alias(root, "Base", "pkg._impl.Base");
        let leaf = b.class(root, "Leaf");
        b.set_bases(leaf, &["pkg._impl.Base"]);
        let graph = b.build();
        let api = api_for(&graph, &["pkg.Base", "pkg.Leaf"]);

        let bases = collect_bases(&graph, leaf, &api, &[]).unwrap();
        assert_eq!(bases, vec![("pkg.Base".to_string(), true)]);
    }

    #[test]
    fn test_first_occurrence_wins_on_duplicates() {
        let mut b = GraphBuilder::package("pkg");
        let root = b.root();
        b.class(root, "Shared");
        let mid_a = b.class(root, "_A");
        b.set_bases(mid_a, &["pkg.Shared"]);
        let mid_b = b.class(root, "_B");
        b.set_bases(mid_b, &["pkg.Shared"]);
        let leaf = b.class(root, "Leaf");
        b.set_bases(leaf, &["pkg._A", "pkg._B"]);
        let graph = b.build();
        let api = api_for(&graph, &["pkg.Shared", "pkg.Leaf"]);

        let bases = collect_bases(&graph, leaf, &api, &[]).unwrap();
        assert_eq!(bases, vec![("pkg.Shared".to_string(), true)]);
    }

    #[test]
    fn test_inheritance_cycle_terminates() {
        let mut b = GraphBuilder::package("pkg");
        let root = b.root();
        let a = b.class(root, "_A");
        let c = b.class(root, "_B");
        b.set_bases(a, &["pkg._B"]);
        b.set_bases(c, &["pkg._A"]);
        let leaf = b.class(root, "Leaf");
        b.set_bases(leaf, &["pkg._A"]);
        let graph = b.build();
        let api = api_for(&graph, &["pkg.Leaf"]);

        let bases = collect_bases(&graph, leaf, &api, &[]).unwrap();
        assert!(bases.is_empty());
    }
}
