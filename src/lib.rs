//! pubmap - public-API enrichment for documentation object graphs
//!
//! Given a package's fully-loaded object graph, pubmap decides which
//! objects belong to the public API and rewrites displayed metadata so
//! cross-references point at canonical public names instead of internal
//! implementation paths.
//!
//! # Architecture
//!
//! ```text
//! Object Graph → Public-API Walk → Signature Rewrite → Base Flattening → Permalinks
//!       ↓               ↓                 ↓                  ↓               ↓
//!    serde       agenda + visited    TypeExpr pretty     first-wins     git rev-parse
//!    model            set             + substitution     flattening      (memoized)
//! ```
//!
//! The whole thing is one synchronous pass per package: build the index,
//! enrich every public object, throw the index away.

pub mod bases;
pub mod config;
pub mod enrich;
pub mod error;
pub mod resolve;
pub mod rewrite;
pub mod srclink;
pub mod types;

// Re-export core types
pub use types::{
    DisplayParameter, DisplaySignature, Enrichment, GraphBuilder, NodeId, ObjectGraph,
    ObjectKind, ObjectNode, ParamKind, RawParameter, RawSignature, SourceSpan, TypeExpr,
};

// Re-export the pipeline surface
pub use config::{Config, SourceLinkMode};
pub use enrich::{Enricher, CLASS_TEMPLATE, FUNCTION_TEMPLATE};
pub use error::{AliasError, ApiLookupError, SourceLinkError};
pub use resolve::PublicApi;
