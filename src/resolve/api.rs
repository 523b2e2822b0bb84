//! The public-API index: which objects are effectively public, and under
//! which display paths.
//!
//! Publicity starts from an externally declared set of top-level dotted
//! paths and is inherited downward unconditionally: once an object is
//! public, all of its members are too. Objects outside the public API are
//! still examined, since a non-public container may re-export or contain
//! public children.
//!
//! The walk is an explicit agenda of (node, force-public) pairs with a
//! visited set, so cyclic alias graphs terminate. Aliases are resolved to
//! their final targets before recording; an alias that renames its target
//! counts as private, since renaming on import signals deliberate
//! non-canonical exposure.

use std::collections::{HashMap, HashSet};

use crate::config::Config;
use crate::error::ApiLookupError;
use crate::resolve::alias::final_target;
use crate::types::{NodeId, ObjectGraph};

/// Private means a single leading underscore, except dunder names.
fn is_private(name: &str) -> bool {
    name.starts_with('_') && !(name.starts_with("__") && name.ends_with("__"))
}

/// The computed public API of a package.
pub struct PublicApi {
    /// Canonical public objects, in first-recorded order.
    objects: Vec<NodeId>,
    object_set: HashSet<NodeId>,
    /// Subset reached directly through a top-level public path.
    toplevel: Vec<NodeId>,
    toplevel_set: HashSet<NodeId>,
    /// Canonical dotted path -> every public path it is reachable through.
    paths: HashMap<String, Vec<String>>,
    builtin_modules: Vec<String>,
    public_modules: Vec<String>,
}

impl PublicApi {
    /// Walk the graph from its root and compute the public API.
    pub fn build(graph: &ObjectGraph, config: &Config) -> Self {
        let mut api = Self {
            objects: Vec::new(),
            object_set: HashSet::new(),
            toplevel: Vec::new(),
            toplevel_set: HashSet::new(),
            paths: HashMap::new(),
            builtin_modules: config.builtin_modules.clone(),
            public_modules: config.public_modules(),
        };

        let top_level = &config.top_level_public_api;
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut agenda: Vec<(NodeId, bool)> = vec![(graph.root(), false)];

        while let Some((id, force_public)) = agenda.pop() {
            seen.insert(id);
            let item = graph.node(id);

            // Skip private elements
            if is_private(&item.name) {
                continue;
            }

            let final_id = if item.is_alias() {
                match final_target(graph, id) {
                    Ok(target) => {
                        if graph.node(target).name != item.name {
                            // Renaming during import counts as private.
                            continue;
                        }
                        target
                    }
                    Err(_) => continue,
                }
            } else {
                id
            };

            let toplevel_public = top_level.contains(&item.path);
            if force_public || toplevel_public {
                // Everything below a public object is public as well, so
                // members skip the top-level check entirely.
                agenda.extend(
                    graph
                        .node(final_id)
                        .members
                        .iter()
                        .copied()
                        .filter(|m| !seen.contains(m))
                        .map(|m| (m, true)),
                );
                let canonical = graph.node(final_id).path.clone();
                api.paths
                    .entry(canonical)
                    .or_default()
                    .push(item.path.clone());
                if api.object_set.insert(final_id) {
                    api.objects.push(final_id);
                }
                if toplevel_public && api.toplevel_set.insert(final_id) {
                    api.toplevel.push(final_id);
                }
            } else {
                // Not public itself, but members might be.
                agenda.extend(
                    graph
                        .node(final_id)
                        .members
                        .iter()
                        .copied()
                        .filter(|m| !seen.contains(m))
                        .map(|m| (m, false)),
                );
            }
        }

        api
    }

    /// Canonical public objects, in first-recorded order.
    pub fn objects(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.objects.iter().copied()
    }

    /// Public objects reached directly through a top-level public path.
    pub fn toplevel(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.toplevel.iter().copied()
    }

    pub fn is_public(&self, id: NodeId) -> bool {
        self.object_set.contains(&id)
    }

    pub fn is_toplevel(&self, id: NodeId) -> bool {
        self.toplevel_set.contains(&id)
    }

    /// Look up the display path for a canonical dotted path.
    ///
    /// Returns `(display_path, needs_autoref)`. An exact unambiguous hit
    /// returns the recorded public path with autoref on. Misses fall back
    /// to the builtin-module prefixes (stripped from display) and then the
    /// trusted public-module prefixes (displayed as-is), both without
    /// autoref. A key recorded under more than one public path is an error:
    /// the display choice would be non-deterministic.
    pub fn lookup(&self, key: &str) -> Result<(String, bool), ApiLookupError> {
        let paths = match self.paths.get(key) {
            Some(paths) => paths,
            None => {
                for module in &self.builtin_modules {
                    if let Some(rest) = strip_module_prefix(key, module) {
                        return Ok((rest.to_string(), false));
                    }
                }
                for module in &self.public_modules {
                    if strip_module_prefix(key, module).is_some() {
                        return Ok((key.to_string(), false));
                    }
                }
                return Err(ApiLookupError::NotPublic {
                    path: key.to_string(),
                });
            }
        };
        if paths.len() == 1 {
            Ok((paths[0].clone(), true))
        } else {
            Err(ApiLookupError::Ambiguous {
                path: key.to_string(),
                candidates: paths.clone(),
            })
        }
    }
}

/// `key.strip_prefix(module + ".")` without the intermediate allocation.
fn strip_module_prefix<'a>(key: &'a str, module: &str) -> Option<&'a str> {
    let rest = key.strip_prefix(module)?;
    rest.strip_prefix('.')
}
