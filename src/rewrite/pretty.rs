//! Flat pretty-printing of annotation trees with public-name substitution.
//!
//! The printer renders a `TypeExpr` on one line. Every concrete type
//! reference is offered to the public-API index first: an unambiguous hit
//! replaces the internal path with the canonical public one, a miss leaves
//! the path as written, and an ambiguous hit is an error since the display
//! choice would be non-deterministic.
//!
//! Forward references (string annotations) are resolved best-effort against
//! the defining module's namespace. There is no code evaluation: a string
//! either names something the object graph can see, or it stays a string.

use crate::error::ApiLookupError;
use crate::resolve::alias::final_target;
use crate::resolve::PublicApi;
use crate::types::{NodeId, ObjectGraph, TypeExpr};

/// Rendering context: the index to substitute against and the namespace
/// forward references resolve in.
pub struct SubstContext<'a> {
    pub graph: &'a ObjectGraph,
    pub api: &'a PublicApi,
    /// Defining module of the annotation's owner, if known.
    pub module: Option<NodeId>,
}

impl SubstContext<'_> {
    /// Render an annotation tree to its display string.
    pub fn render(&self, expr: &TypeExpr) -> Result<String, ApiLookupError> {
        match expr {
            TypeExpr::Name { path } => self.display_name(path),
            TypeExpr::Literal(args) => Ok(format!("Literal[{}]", args.join(", "))),
            TypeExpr::Generic { base, args } => {
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    rendered.push(self.render(arg)?);
                }
                Ok(format!("{}[{}]", self.render(base)?, rendered.join(", ")))
            }
            TypeExpr::Tuple(args) => {
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    rendered.push(self.render(arg)?);
                }
                Ok(format!("({})", rendered.join(", ")))
            }
            TypeExpr::Union(args) => {
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    rendered.push(self.render(arg)?);
                }
                Ok(rendered.join(" | "))
            }
            TypeExpr::None => Ok("None".to_string()),
            TypeExpr::ForwardRef(text) => {
                match resolve_forward_ref(self.graph, self.module, text) {
                    Some(path) => self.display_name(&path),
                    // Unresolvable strings stay strings.
                    None => Ok(format!("'{text}'")),
                }
            }
            TypeExpr::Verbatim(text) => Ok(text.clone()),
        }
    }

    /// The display form of a dotted type path: the canonical public path
    /// when the index knows one, the path as written otherwise.
    fn display_name(&self, path: &str) -> Result<String, ApiLookupError> {
        match self.api.lookup(path) {
            Ok((display, _)) => Ok(display),
            Err(err) if err.is_recoverable() => Ok(path.to_string()),
            Err(err) => Err(err),
        }
    }
}

/// Resolve a forward-reference string against a module's namespace.
///
/// Accepts plain and dotted names only; anything else (a subscript, a call,
/// an operator expression) is not resolvable without evaluation and returns
/// `None`. Resolution walks member edges segment by segment, following
/// alias links at each step, then falls back to treating the text as an
/// absolute path in the graph. Returns the final target's defining path.
pub fn resolve_forward_ref(
    graph: &ObjectGraph,
    module: Option<NodeId>,
    text: &str,
) -> Option<String> {
    if text.is_empty()
        || !text
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
    {
        return None;
    }

    if let Some(module) = module {
        if let Some(found) = walk_members(graph, module, text) {
            return Some(graph.node(found).path.clone());
        }
    }

    let absolute = graph.by_path(text)?;
    let resolved = final_target(graph, absolute).ok()?;
    Some(graph.node(resolved).path.clone())
}

fn walk_members(graph: &ObjectGraph, scope: NodeId, text: &str) -> Option<NodeId> {
    let mut current = scope;
    for segment in text.split('.') {
        if segment.is_empty() {
            return None;
        }
        let member = graph
            .node(current)
            .members
            .iter()
            .copied()
            .find(|&m| graph.node(m).name.as_ref() == segment)?;
        current = final_target(graph, member).ok()?;
    }
    Some(current)
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

    fn name(path: &str) -> TypeExpr {
        TypeExpr::Name {
            path: path.to_string(),
        }
    }

    #[test]
    fn test_literal_arguments_stay_verbatim() {
        let mut b = GraphBuilder::package("pkg");
        let root = b.root();
        // Classes named like builtins exist and are public - they must not
        // capture the literal's string arguments.
        b.class(root, "int");
        b.class(root, "str");
        let graph = b.build();
        let api = api_for(&graph, &["pkg.int", "pkg.str"]);
        let ctx = SubstContext {
            graph: &graph,
            api: &api,
            module: Some(graph.root()),
        };

        let expr = TypeExpr::Literal(vec!["'int'".to_string(), "'str'".to_string()]);
        assert_eq!(ctx.render(&expr).unwrap(), "Literal['int', 'str']");
    }

    #[test]
    fn test_generic_substitutes_base_and_args() {
        let mut b = GraphBuilder::package("pkg");
        let root = b.root();
        let sub = b.module(root, "_impl");
        b.class(sub, "Foo");
        b.alias(root, "Foo", "pkg._impl.Foo");
        let graph = b.build();
        let api = api_for(&graph, &["pkg.Foo"]);
        let ctx = SubstContext {
            graph: &graph,
            api: &api,
            module: Some(root),
        };

        let expr = TypeExpr::Generic {
            base: Box::new(name("builtins.list")),
            args: vec![name("pkg._impl.Foo")],
        };
        assert_eq!(ctx.render(&expr).unwrap(), "list[pkg.Foo]");
    }

    #[test]
    fn test_union_and_none() {
        let b = GraphBuilder::package("pkg");
        let graph = b.build();
        let api = api_for(&graph, &[]);
        let ctx = SubstContext {
            graph: &graph,
            api: &api,
            module: None,
        };

        let expr = TypeExpr::Union(vec![name("builtins.int"), TypeExpr::None]);
        assert_eq!(ctx.render(&expr).unwrap(), "int | None");
    }

    #[test]
    fn test_not_public_path_rendered_as_written() {
        let b = GraphBuilder::package("pkg");
        let graph = b.build();
        let api = api_for(&graph, &[]);
        let ctx = SubstContext {
            graph: &graph,
            api: &api,
            module: None,
        };

        assert_eq!(
            ctx.render(&name("pkg._impl.Hidden")).unwrap(),
            "pkg._impl.Hidden"
        );
    }

    #[test]
    fn test_ambiguous_path_propagates() {
        let mut b = GraphBuilder::package("pkg");
        let root = b.root();
        let sub = b.module(root, "_impl");
        b.class(sub, "Foo");
        b.alias(root, "Foo", "pkg._impl.Foo");
        let compat = b.module(root, "compat");
        b.alias(compat, "Foo", "pkg._impl.Foo");
        let graph = b.build();
        let api = api_for(&graph, &["pkg.Foo", "pkg.compat.Foo"]);
        let ctx = SubstContext {
            graph: &graph,
            api: &api,
            module: None,
        };

        assert!(matches!(
            ctx.render(&name("pkg._impl.Foo")),
            Err(ApiLookupError::Ambiguous { .. })
        ));
    }

    #[test]
    fn test_forward_ref_resolves_through_module_namespace() {
        let mut b = GraphBuilder::package("pkg");
        let root = b.root();
        let sub = b.module(root, "_impl");
        b.class(sub, "Foo");
        b.alias(root, "Foo", "pkg._impl.Foo");
        let graph = b.build();
        let api = api_for(&graph, &["pkg.Foo"]);
        let ctx = SubstContext {
            graph: &graph,
            api: &api,
            module: Some(root),
        };

        // "Foo" names the alias in pkg's namespace; it resolves to the
        // defining class and displays under the canonical public path.
        let expr = TypeExpr::ForwardRef("Foo".to_string());
        assert_eq!(ctx.render(&expr).unwrap(), "pkg.Foo");
    }

    #[test]
    fn test_forward_ref_failure_passes_through() {
        let b = GraphBuilder::package("pkg");
        let graph = b.build();
        let api = api_for(&graph, &[]);
        let ctx = SubstContext {
            graph: &graph,
            api: &api,
            module: Some(graph.root()),
        };

        let expr = TypeExpr::ForwardRef("NoSuchThing".to_string());
        assert_eq!(ctx.render(&expr).unwrap(), "'NoSuchThing'");

        // Arbitrary expressions are not evaluated.
        let expr = TypeExpr::ForwardRef("list[int]".to_string());
        assert_eq!(ctx.render(&expr).unwrap(), "'list[int]'");
    }

    #[test]
    fn test_forward_ref_absolute_path() {
        let mut b = GraphBuilder::package("pkg");
        let root = b.root();
        let sub = b.module(root, "util");
        b.class(sub, "Thing");
        let graph = b.build();
        let api = api_for(&graph, &["pkg.util.Thing"]);
        let ctx = SubstContext {
            graph: &graph,
            api: &api,
            module: Some(root),
        };

        // Dotted resolution through the module tree.
        let expr = TypeExpr::ForwardRef("util.Thing".to_string());
        assert_eq!(ctx.render(&expr).unwrap(), "pkg.util.Thing");
    }
}
