//! Core types for pubmap - the object graph and its enrichment metadata.
//!
//! The host documentation tool hands us a fully-loaded object graph
//! (package -> modules -> classes/functions/attributes). This module models
//! that graph in a form we can both deserialize from a host and build by
//! hand in tests. Key design decisions:
//! - Arena storage: nodes live in one `Vec`, referenced by `NodeId`
//! - `Arc<str>` for shared ownership of interned names
//! - Annotations are a typed expression tree (`TypeExpr`), not live values

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serde serialization helpers for Arc<str> fields
mod arc_str_serde {
    use super::*;

    pub fn serialize<S>(arc: &Arc<str>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(arc.as_ref())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Arc<str>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.into())
    }
}

/// Index of a node within its `ObjectGraph` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The kind of object a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Module,
    Class,
    Function,
    Attribute,
}

impl ObjectKind {
    pub fn is_module(self) -> bool {
        matches!(self, ObjectKind::Module)
    }

    pub fn is_class(self) -> bool {
        matches!(self, ObjectKind::Class)
    }

    pub fn is_function(self) -> bool {
        matches!(self, ObjectKind::Function)
    }

    pub fn is_attribute(self) -> bool {
        matches!(self, ObjectKind::Attribute)
    }
}

/// Parameter kind, mirroring the host's call conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    PositionalOnly,
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

/// A type annotation as an expression tree.
///
/// This is the statically-typed stand-in for the live annotation values the
/// host inspects at load time. Leaves carry the dotted path the annotation
/// was written against; display-time substitution swaps those for canonical
/// public paths where possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeExpr {
    /// A concrete type reference by its defining dotted path,
    /// e.g. `pkg._impl.Foo` or `builtins.int`.
    Name { path: String },
    /// `Literal[...]` - argument display text kept verbatim, never resolved.
    Literal(Vec<String>),
    /// A parameterized type, e.g. `list[int]`.
    Generic {
        base: Box<TypeExpr>,
        args: Vec<TypeExpr>,
    },
    /// A parenthesized group of types, e.g. the argument list of a callable.
    Tuple(Vec<TypeExpr>),
    /// A union, displayed with `|`.
    Union(Vec<TypeExpr>),
    /// The `None` singleton. Never substituted.
    None,
    /// A string annotation (forward reference), resolved best-effort against
    /// the defining module's namespace at display time.
    ForwardRef(String),
    /// Opaque display text that passes through untouched.
    Verbatim(String),
}

/// A parameter as loaded from the host: name, kind, annotation tree, and the
/// display text of its default value (if any). Defaults are values, not
/// types, so they carry no structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawParameter {
    #[serde(with = "arc_str_serde")]
    pub name: Arc<str>,
    pub kind: ParamKind,
    pub annotation: Option<TypeExpr>,
    pub default: Option<String>,
}

/// A function's call signature as loaded from the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawSignature {
    pub parameters: Vec<RawParameter>,
    pub returns: Option<TypeExpr>,
}

/// A parameter after display rewriting: annotation and default are now
/// plain display strings with canonical public paths substituted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayParameter {
    #[serde(with = "arc_str_serde")]
    pub name: Arc<str>,
    pub kind: ParamKind,
    pub annotation: Option<String>,
    pub default: Option<String>,
}

/// A rewritten signature ready for template consumption.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplaySignature {
    pub parameters: Vec<DisplayParameter>,
    pub returns: Option<String>,
}

/// Source location of an object: file plus 1-indexed line range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub filepath: std::path::PathBuf,
    pub lineno: u32,
    pub endlineno: u32,
}

/// Enrichment metadata attached per object for template consumption.
/// Written by the enrichment pass; empty until then.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Enrichment {
    /// Rendering template identifier chosen for this object.
    pub template: Option<String>,
    /// Rewritten parameter/return display signature (functions).
    pub signature: Option<DisplaySignature>,
    /// Ordered display-base-name -> auto-cross-reference flag (classes).
    pub public_bases: Option<Vec<(String, bool)>>,
    /// Resolved permalink into the repository's source.
    pub source_url: Option<String>,
    /// Suppress the raw value display (attributes).
    pub hide_value: bool,
}

/// A single node in the object graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectNode {
    /// Short name, e.g. "Foo"
    #[serde(with = "arc_str_serde")]
    pub name: Arc<str>,
    /// Dotted path, e.g. "pkg._impl.Foo"
    pub path: String,
    pub kind: ObjectKind,
    pub parent: Option<NodeId>,
    /// Member nodes in declaration order
    pub members: Vec<NodeId>,
    /// Re-export link: the dotted path this node points at, if it is an alias
    pub alias_target: Option<String>,
    /// Declared base classes, by dotted path (classes only)
    pub bases: Vec<String>,
    /// Call signature (functions only)
    pub signature: Option<RawSignature>,
    /// Raw value display text (attributes only)
    pub value: Option<String>,
    /// Host-assigned labels, e.g. "module" on module-level attributes
    pub labels: BTreeSet<String>,
    pub span: Option<SourceSpan>,
    #[serde(default)]
    pub extra: Enrichment,
}

impl ObjectNode {
    pub fn is_alias(&self) -> bool {
        self.alias_target.is_some()
    }
}

/// The object graph: an arena of nodes plus a path index and a package root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectGraph {
    nodes: Vec<ObjectNode>,
    root: NodeId,
    #[serde(skip)]
    by_path: HashMap<String, NodeId>,
}

impl ObjectGraph {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &ObjectNode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ObjectNode {
        &mut self.nodes[id.index()]
    }

    /// Look up a node by its dotted path.
    pub fn by_path(&self, path: &str) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// The nearest enclosing module of a node (the node itself if it is one).
    pub fn enclosing_module(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(cur) = current {
            if self.node(cur).kind.is_module() {
                return Some(cur);
            }
            current = self.node(cur).parent;
        }
        None
    }

    /// Rebuild the path index. Called after deserialization, since the index
    /// is derived state and not part of the wire format.
    pub fn reindex(&mut self) {
        self.by_path = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.path.clone(), NodeId(i as u32)))
            .collect();
    }

    /// Deserialize a graph from JSON produced by a host.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut graph: ObjectGraph = serde_json::from_str(json)?;
        graph.reindex();
        Ok(graph)
    }
}

/// Incremental construction of an `ObjectGraph`.
///
/// Hosts that do not go through serialization (and our tests) build graphs
/// node by node. Paths are derived from the parent chain.
pub struct GraphBuilder {
    nodes: Vec<ObjectNode>,
    by_path: HashMap<String, NodeId>,
    root: NodeId,
}

impl GraphBuilder {
    /// Start a graph rooted at a package module with the given name.
    pub fn package(name: &str) -> Self {
        let root = ObjectNode {
            name: name.into(),
            path: name.to_string(),
            kind: ObjectKind::Module,
            parent: None,
            members: Vec::new(),
            alias_target: None,
            bases: Vec::new(),
            signature: None,
            value: None,
            labels: BTreeSet::new(),
            span: None,
            extra: Enrichment::default(),
        };
        let mut by_path = HashMap::new();
        by_path.insert(name.to_string(), NodeId(0));
        Self {
            nodes: vec![root],
            by_path,
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn push(&mut self, parent: NodeId, kind: ObjectKind, name: &str) -> NodeId {
        let path = format!("{}.{}", self.nodes[parent.index()].path, name);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ObjectNode {
            name: name.into(),
            path: path.clone(),
            kind,
            parent: Some(parent),
            members: Vec::new(),
            alias_target: None,
            bases: Vec::new(),
            signature: None,
            value: None,
            labels: BTreeSet::new(),
            span: None,
            extra: Enrichment::default(),
        });
        self.nodes[parent.index()].members.push(id);
        self.by_path.insert(path, id);
        id
    }

    /// Add a module outside the package tree (another loaded package).
    /// Reachable by path lookup, but not from the package root, so the
    /// public-API walk never visits it.
    pub fn external_module(&mut self, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ObjectNode {
            name: name.into(),
            path: name.to_string(),
            kind: ObjectKind::Module,
            parent: None,
            members: Vec::new(),
            alias_target: None,
            bases: Vec::new(),
            signature: None,
            value: None,
            labels: BTreeSet::new(),
            span: None,
            extra: Enrichment::default(),
        });
        self.by_path.insert(name.to_string(), id);
        id
    }

    pub fn module(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.push(parent, ObjectKind::Module, name)
    }

    pub fn class(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.push(parent, ObjectKind::Class, name)
    }

    pub fn function(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.push(parent, ObjectKind::Function, name)
    }

    pub fn attribute(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.push(parent, ObjectKind::Attribute, name)
    }

    /// Add an alias (re-export) member pointing at `target` by dotted path.
    /// The re-exported kind is whatever the final target turns out to be;
    /// the node's own kind is a placeholder until resolution.
    pub fn alias(&mut self, parent: NodeId, name: &str, target: &str) -> NodeId {
        let id = self.push(parent, ObjectKind::Attribute, name);
        self.nodes[id.index()].alias_target = Some(target.to_string());
        id
    }

    pub fn set_bases(&mut self, id: NodeId, bases: &[&str]) {
        self.nodes[id.index()].bases = bases.iter().map(|s| s.to_string()).collect();
    }

    pub fn set_signature(&mut self, id: NodeId, signature: RawSignature) {
        self.nodes[id.index()].signature = Some(signature);
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) {
        self.nodes[id.index()].value = Some(value.to_string());
    }

    pub fn set_label(&mut self, id: NodeId, label: &str) {
        self.nodes[id.index()].labels.insert(label.to_string());
    }

    pub fn set_span(&mut self, id: NodeId, filepath: &str, lineno: u32, endlineno: u32) {
        self.nodes[id.index()].span = Some(SourceSpan {
            filepath: filepath.into(),
            lineno,
            endlineno,
        });
    }

    pub fn build(self) -> ObjectGraph {
        ObjectGraph {
            nodes: self.nodes,
            root: self.root,
            by_path: self.by_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_paths() {
        let mut b = GraphBuilder::package("pkg");
        let root = b.root();
        let sub = b.module(root, "_impl");
        let class = b.class(sub, "Foo");
        let graph = b.build();

        assert_eq!(graph.node(class).path, "pkg._impl.Foo");
        assert_eq!(graph.by_path("pkg._impl"), Some(sub));
        assert_eq!(graph.node(sub).members, vec![class]);
        assert_eq!(graph.enclosing_module(class), Some(sub));
    }

    #[test]
    fn test_alias_node() {
        let mut b = GraphBuilder::package("pkg");
        let root = b.root();
        let alias = b.alias(root, "Foo", "pkg._impl.Foo");
        let graph = b.build();

        assert!(graph.node(alias).is_alias());
        assert_eq!(
            graph.node(alias).alias_target.as_deref(),
            Some("pkg._impl.Foo")
        );
    }

    #[test]
    fn test_json_round_trip_rebuilds_index() {
        let mut b = GraphBuilder::package("pkg");
        let root = b.root();
        let f = b.function(root, "run");
        b.set_signature(
            f,
            RawSignature {
                parameters: vec![RawParameter {
                    name: "x".into(),
                    kind: ParamKind::PositionalOrKeyword,
                    annotation: Some(TypeExpr::Name {
                        path: "builtins.int".to_string(),
                    }),
                    default: Some("0".to_string()),
                }],
                returns: Some(TypeExpr::None),
            },
        );
        let graph = b.build();

        let json = serde_json::to_string(&graph).unwrap();
        let restored = ObjectGraph::from_json(&json).unwrap();
        assert_eq!(restored.by_path("pkg.run"), Some(f));
        assert_eq!(restored.node(f).signature, graph.node(f).signature);
    }

    #[test]
    fn test_kind_helpers() {
        assert!(ObjectKind::Module.is_module());
        assert!(ObjectKind::Class.is_class());
        assert!(!ObjectKind::Function.is_class());
        assert!(ObjectKind::Attribute.is_attribute());
    }
}
