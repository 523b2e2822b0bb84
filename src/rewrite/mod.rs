//! Signature rewriting - from raw annotation trees to display strings.
//!
//! For each public function, the raw signature loaded from the host is
//! re-rendered so that any type in the public API shows its canonical
//! public path instead of the internal path it was defined under.
//! Constructors are special: an `__init__` is always displayed as a
//! constructor, never as something that "returns None", so any return
//! annotation on it is discarded.

pub mod pretty;

pub use pretty::SubstContext;

use crate::error::ApiLookupError;
use crate::resolve::PublicApi;
use crate::types::{DisplayParameter, DisplaySignature, NodeId, ObjectGraph};

/// Build the display signature for a function node.
///
/// Returns `Ok(None)` when the node carries no raw signature. Annotations
/// are rendered with public-name substitution in the defining module's
/// namespace; defaults are values, not types, so they pass through without
/// the substitution context. Only ambiguity errors propagate - a type that
/// is simply not public is displayed as written.
pub fn prettify_function(
    graph: &ObjectGraph,
    func: NodeId,
    api: &PublicApi,
) -> Result<Option<DisplaySignature>, ApiLookupError> {
    let node = graph.node(func);
    let signature = match &node.signature {
        Some(signature) => signature,
        None => return Ok(None),
    };
    let ctx = SubstContext {
        graph,
        api,
        module: graph.enclosing_module(func),
    };

    let mut parameters = Vec::with_capacity(signature.parameters.len());
    for param in &signature.parameters {
        let annotation = match &param.annotation {
            Some(annotation) => Some(ctx.render(annotation)?),
            None => None,
        };
        parameters.push(DisplayParameter {
            name: param.name.clone(),
            kind: param.kind,
            annotation,
            default: param.default.clone(),
        });
    }

    let returns = if node.name.as_ref() == "__init__" {
        None
    } else {
        match &signature.returns {
            Some(returns) => Some(ctx.render(returns)?),
            None => None,
        }
    };

    Ok(Some(DisplaySignature { parameters, returns }))
}
