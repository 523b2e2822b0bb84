//! Source permalinks - resolving git metadata into per-object URLs.
//!
//! We spawn `git` rather than binding libgit2: two `rev-parse` calls per
//! process are not worth an FFI dependency, and spawning works with any
//! git version. Both values are immutable for the lifetime of the process,
//! so the result is memoized process-wide, keyed by the configured
//! repository URL.
//!
//! Only `github.com` and `gitlab.com` URL shapes are supported: the link
//! format has to match what the host expects, so it is hardcoded rather
//! than exposed as a template.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::error::SourceLinkError;
use crate::types::SourceSpan;

pub use crate::config::SourceLinkMode;

/// Resolved repository metadata: the checkout's toplevel directory and a
/// URL template with `{path}`, `{start}` and `{end}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub toplevel: PathBuf,
    url_template: String,
}

impl RepoInfo {
    /// Fill in the template for a source span, with `path` relative to the
    /// repository toplevel.
    pub fn url_for(&self, relative_path: &Path, span: &SourceSpan) -> String {
        self.url_template
            .replace("{path}", &relative_path.to_string_lossy())
            .replace("{start}", &span.lineno.to_string())
            .replace("{end}", &span.endlineno.to_string())
    }
}

static REPO_CACHE: Lazy<Mutex<HashMap<String, Arc<RepoInfo>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Resolve repository metadata for the configured URL, at most once per
/// distinct URL per process.
pub fn repo_info(repo_url: Option<&str>) -> Result<Arc<RepoInfo>, SourceLinkError> {
    let repo_url = repo_url.ok_or(SourceLinkError::MissingRepoUrl)?;

    let mut cache = REPO_CACHE.lock().expect("repo cache poisoned");
    if let Some(info) = cache.get(repo_url) {
        return Ok(info.clone());
    }

    let info = Arc::new(resolve_repo_info(repo_url)?);
    cache.insert(repo_url.to_string(), info.clone());
    Ok(info)
}

fn resolve_repo_info(repo_url: &str) -> Result<RepoInfo, SourceLinkError> {
    let commit = git_rev_parse(&["rev-parse", "HEAD"])?;
    let toplevel = git_rev_parse(&["rev-parse", "--show-toplevel"])?;

    let trimmed = repo_url.strip_prefix("https://").unwrap_or(repo_url);
    if !(trimmed.starts_with("github.com") || trimmed.starts_with("gitlab.com")) {
        return Err(SourceLinkError::UnsupportedHost(repo_url.to_string()));
    }

    let base = repo_url.strip_suffix('/').unwrap_or(repo_url);
    Ok(RepoInfo {
        toplevel: PathBuf::from(toplevel),
        url_template: format!("{base}/blob/{commit}/{{path}}#L{{start}}-{{end}}"),
    })
}

/// Run one git query, treating any failure as "not a git repository".
fn git_rev_parse(args: &[&str]) -> Result<String, SourceLinkError> {
    let output = Command::new("git")
        .args(args)
        .output()
        .map_err(|_| SourceLinkError::NotAGitRepository)?;
    if !output.status.success() {
        return Err(SourceLinkError::NotAGitRepository);
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_repo_url() {
        assert_eq!(repo_info(None), Err(SourceLinkError::MissingRepoUrl));
    }

    #[test]
    fn test_unsupported_host_rejected() {
        // Host validation happens after the git queries; run from a repo so
        // the git step cannot mask it, otherwise accept either error.
        match repo_info(Some("https://example.com/me/repo")) {
            Err(SourceLinkError::UnsupportedHost(url)) => {
                assert!(url.contains("example.com"));
            }
            Err(SourceLinkError::NotAGitRepository) => {}
            other => panic!("expected a configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_url_template_fill() {
        let info = RepoInfo {
            toplevel: PathBuf::from("/repo"),
            url_template:
                "https://github.com/example/pkg/blob/abc123/{path}#L{start}-{end}".to_string(),
        };
        let span = SourceSpan {
            filepath: PathBuf::from("/repo/src/foo.py"),
            lineno: 10,
            endlineno: 20,
        };
        assert_eq!(
            info.url_for(Path::new("src/foo.py"), &span),
            "https://github.com/example/pkg/blob/abc123/src/foo.py#L10-20"
        );
    }

    #[test]
    fn test_trailing_slash_stripped_from_base() {
        // Exercise the pure template construction, bypassing git.
        let base = "https://github.com/example/pkg/";
        let base = base.strip_suffix('/').unwrap_or(base);
        let template = format!("{base}/blob/abc/{{path}}#L{{start}}-{{end}}");
        assert!(template.starts_with("https://github.com/example/pkg/blob/"));
    }
}
