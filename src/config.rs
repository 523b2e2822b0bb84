//! Configuration loading from pyproject.toml and pubmap.toml.
//!
//! Follows the conventions documentation tooling users already know:
//! - `[tool.pubmap]` section in pyproject.toml
//! - Standalone pubmap.toml as fallback
//!
//! ## Example
//!
//! ```toml
//! [tool.pubmap]
//! top-level-public-api = ["pkg.Foo", "pkg.run"]
//! extra-public-modules = ["numpy"]
//! show-bases = true
//! show-source-links = "toplevel"
//! repo-url = "https://github.com/example/pkg"
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Which objects receive source permalinks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLinkMode {
    /// No links at all.
    #[default]
    None,
    /// Links only for objects named in the top-level public API set.
    Toplevel,
    /// Links for every public object.
    All,
}

/// Pubmap configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source file for this config (for display).
    pub source: Option<PathBuf>,

    /// Declared roots of public visibility, as dotted paths.
    pub top_level_public_api: BTreeSet<String>,

    /// Module-name prefixes whose members are public with the prefix
    /// stripped from display (not cross-referenced).
    pub builtin_modules: Vec<String>,

    /// Stdlib module prefixes trusted as public without traversal.
    pub stdlib_modules: Vec<String>,

    /// User-declared extra module prefixes trusted as public.
    pub extra_public_modules: Vec<String>,

    /// Whether to compute flattened base-class lists for public classes.
    pub show_bases: bool,

    /// Which objects get source permalinks.
    pub show_source_links: SourceLinkMode,

    /// Repository URL used for permalink templating.
    pub repo_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            top_level_public_api: BTreeSet::new(),
            builtin_modules: vec!["builtins".to_string()],
            stdlib_modules: Vec::new(),
            extra_public_modules: Vec::new(),
            show_bases: true,
            show_source_links: SourceLinkMode::None,
            repo_url: None,
        }
    }
}

/// Raw config as deserialized from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
struct RawConfig {
    top_level_public_api: Option<Vec<String>>,
    builtin_modules: Option<Vec<String>>,
    stdlib_modules: Option<Vec<String>>,
    extra_public_modules: Option<Vec<String>>,
    show_bases: Option<bool>,
    show_source_links: Option<SourceLinkMode>,
    repo_url: Option<String>,
}

/// Wrapper for pyproject.toml structure.
#[derive(Debug, Deserialize)]
struct PyProject {
    tool: Option<PyProjectTool>,
}

#[derive(Debug, Deserialize)]
struct PyProjectTool {
    pubmap: Option<RawConfig>,
}

impl Config {
    /// Load configuration from the given directory.
    ///
    /// Search order:
    /// 1. pubmap.toml in directory
    /// 2. pyproject.toml [tool.pubmap] in directory
    /// 3. Walk up to find pyproject.toml
    /// 4. Default config if nothing found
    pub fn load(directory: &Path) -> Self {
        let pubmap_toml = directory.join("pubmap.toml");
        if pubmap_toml.exists() {
            if let Some(config) = Self::load_pubmap_toml(&pubmap_toml) {
                return config;
            }
        }

        let pyproject = directory.join("pyproject.toml");
        if pyproject.exists() {
            if let Some(config) = Self::load_pyproject(&pyproject) {
                return config;
            }
        }

        let mut current = directory.to_path_buf();
        while let Some(parent) = current.parent() {
            let pyproject = parent.join("pyproject.toml");
            if pyproject.exists() {
                if let Some(config) = Self::load_pyproject(&pyproject) {
                    return config;
                }
            }
            current = parent.to_path_buf();
        }

        Self::default()
    }

    fn load_pubmap_toml(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        let raw: RawConfig = toml::from_str(&content).ok()?;
        Some(Self::from_raw(raw, path.to_path_buf()))
    }

    fn load_pyproject(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        let pyproject: PyProject = toml::from_str(&content).ok()?;
        let raw = pyproject.tool?.pubmap?;
        Some(Self::from_raw(raw, path.to_path_buf()))
    }

    fn from_raw(raw: RawConfig, source: PathBuf) -> Self {
        let defaults = Self::default();
        Self {
            source: Some(source),
            top_level_public_api: raw
                .top_level_public_api
                .unwrap_or_default()
                .into_iter()
                .collect(),
            builtin_modules: raw.builtin_modules.unwrap_or(defaults.builtin_modules),
            stdlib_modules: raw.stdlib_modules.unwrap_or_default(),
            extra_public_modules: raw.extra_public_modules.unwrap_or_default(),
            show_bases: raw.show_bases.unwrap_or(defaults.show_bases),
            show_source_links: raw.show_source_links.unwrap_or_default(),
            repo_url: raw.repo_url,
        }
    }

    /// Module prefixes trusted as public and cross-reference-eligible
    /// without being walked (stdlib + user-declared).
    pub fn public_modules(&self) -> Vec<String> {
        let mut modules = self.stdlib_modules.clone();
        modules.extend(self.extra_public_modules.clone());
        modules
    }

    /// Format config for verbose display.
    pub fn display_summary(&self) -> String {
        let mut lines = Vec::new();

        if let Some(ref source) = self.source {
            lines.push(format!("   Config: {}", source.display()));
        } else {
            lines.push("   Config: (defaults)".to_string());
        }

        if !self.top_level_public_api.is_empty() {
            let roots: Vec<_> = self.top_level_public_api.iter().cloned().collect();
            lines.push(format!("   Public API roots: {}", roots.join(", ")));
        }

        if !self.extra_public_modules.is_empty() {
            lines.push(format!(
                "   Extra public modules: {}",
                self.extra_public_modules.join(", ")
            ));
        }

        lines.join("\n")
    }
}
