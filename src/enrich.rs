//! The enrichment pass - one shot, per loaded package.
//!
//! Order matters only in that normalization precedes the public-API walk
//! and everything else consumes the finished index:
//! 1. Normalize functions (constructors lose return annotations) and
//!    attributes (raw values and "module" labels are suppressed).
//! 2. Build the public-API index.
//! 3. Attach templates, rewritten signatures and flattened base lists to
//!    public objects.
//! 4. Attach source permalinks per the configured mode.
//!
//! The index lives exactly as long as the pass.

use anyhow::{ensure, Context, Result};

use crate::bases::collect_bases;
use crate::config::{Config, SourceLinkMode};
use crate::resolve::PublicApi;
use crate::rewrite::prettify_function;
use crate::srclink::repo_info;
use crate::types::{NodeId, ObjectGraph, ObjectKind};

/// Template identifier attached to public functions.
pub const FUNCTION_TEMPLATE: &str = "pubmap/fn.html.jinja";
/// Template identifier attached to public classes.
pub const CLASS_TEMPLATE: &str = "pubmap/class.html.jinja";

/// Runs the enrichment pass over an object graph.
pub struct Enricher {
    config: Config,
}

impl Enricher {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Enrich every public object in the graph, in place.
    pub fn enrich(&self, graph: &mut ObjectGraph) -> Result<()> {
        ensure!(
            !self.config.top_level_public_api.contains(""),
            "top-level public API paths must be non-empty"
        );

        self.normalize(graph);

        let api = PublicApi::build(graph, &self.config);
        let public_modules = self.config.public_modules();

        let objects: Vec<NodeId> = api.objects().collect();
        for &id in &objects {
            match graph.node(id).kind {
                ObjectKind::Function => {
                    let signature = prettify_function(graph, id, &api)
                        .with_context(|| format!("rewriting `{}`", graph.node(id).path))?;
                    let extra = &mut graph.node_mut(id).extra;
                    extra.template = Some(FUNCTION_TEMPLATE.to_string());
                    extra.signature = signature;
                }
                ObjectKind::Class => {
                    let public_bases = if self.config.show_bases {
                        Some(
                            collect_bases(graph, id, &api, &public_modules).with_context(
                                || format!("collecting bases of `{}`", graph.node(id).path),
                            )?,
                        )
                    } else {
                        None
                    };
                    let extra = &mut graph.node_mut(id).extra;
                    extra.template = Some(CLASS_TEMPLATE.to_string());
                    extra.public_bases = public_bases;
                }
                ObjectKind::Module | ObjectKind::Attribute => {}
            }
        }

        for id in selected_for_links(&api, self.config.show_source_links) {
            let span = match graph.node(id).span.clone() {
                Some(span) => span,
                None => continue,
            };
            let info = repo_info(self.config.repo_url.as_deref())?;
            let relative = span
                .filepath
                .strip_prefix(&info.toplevel)
                .with_context(|| {
                    format!(
                        "source file `{}` is outside the git toplevel `{}`",
                        span.filepath.display(),
                        info.toplevel.display()
                    )
                })?
                .to_path_buf();
            graph.node_mut(id).extra.source_url = Some(info.url_for(&relative, &span));
        }

        Ok(())
    }

    /// Host-independent cleanup applied to every node before the walk.
    fn normalize(&self, graph: &mut ObjectGraph) {
        let ids: Vec<NodeId> = graph.ids().collect();
        for id in ids {
            let node = graph.node_mut(id);
            match node.kind {
                ObjectKind::Function => {
                    // Constructors never display a return annotation.
                    if node.name.as_ref() == "__init__" {
                        if let Some(signature) = node.signature.as_mut() {
                            signature.returns = None;
                        }
                    }
                }
                ObjectKind::Attribute => {
                    // Knowing the value is usually not useful; that is what
                    // the documentation body is for.
                    node.value = None;
                    node.extra.hide_value = true;
                    // The "module attribute" label reads as noise.
                    node.labels.remove("module");
                }
                ObjectKind::Module | ObjectKind::Class => {}
            }
        }
    }
}

/// Which objects receive source links under the given mode.
fn selected_for_links(api: &PublicApi, mode: SourceLinkMode) -> Vec<NodeId> {
    match mode {
        SourceLinkMode::None => Vec::new(),
        SourceLinkMode::Toplevel => api.toplevel().collect(),
        SourceLinkMode::All => api.objects().collect(),
    }
}
