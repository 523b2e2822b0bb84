//! Error taxonomy for the enrichment pass.
//!
//! Three families, with different recoverability:
//! - `AliasError`: alias chains that cannot be followed. Suppressed locally
//!   wherever they occur; the object is treated as absent.
//! - `ApiLookupError`: public-API lookups. `NotPublic` is recoverable at the
//!   two call sites that have a fallback (base flattening recurses, the
//!   signature substitution hook leaves the annotation undecorated);
//!   `Ambiguous` is always fatal since display would be non-deterministic.
//! - `SourceLinkError`: one-time setup problems, fatal with remediation text.

use thiserror::Error;

/// Failure to resolve an alias (re-export) chain to a final target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    #[error("alias target `{0}` does not exist in the object graph")]
    Unresolved(String),

    #[error("alias chain starting at `{0}` is cyclic")]
    Cycle(String),
}

/// Failure to look up a path in the public-API index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiLookupError {
    #[error(
        "tried and failed to find `{path}` in the public API. Common reasons \
         for this error are:\n\
         - it comes from outside this package and that package is not listed \
         under `extra_public_modules`\n\
         - it comes from inside this package but is not reachable from any \
         declared top-level public path\n\
         - a top-level public path is misspelled (for example written with a \
         stray trailing colon)"
    )]
    NotPublic { path: String },

    #[error("`{path}` has multiple paths in the public API: {candidates:?}")]
    Ambiguous {
        path: String,
        candidates: Vec<String>,
    },
}

impl ApiLookupError {
    /// Whether a caller with a fallback may recover from this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ApiLookupError::NotPublic { .. })
    }
}

/// Failure to configure or resolve source permalinks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceLinkError {
    #[error(
        "`show_source_links` requires specifying a top-level `repo_url` in \
         the configuration"
    )]
    MissingRepoUrl,

    #[error(
        "`show_source_links` requires running from a git repository, but \
         could not find a git commit hash or toplevel directory"
    )]
    NotAGitRepository,

    #[error(
        "`show_source_links` currently only supports \
         `repo_url: https://github.com/...` and \
         `repo_url: https://gitlab.com/...`, got `{0}`"
    )]
    UnsupportedHost(String),
}
