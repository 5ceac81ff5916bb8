//! Render orchestration
//!
//! A render call loads content (path entry point only), builds the bindings,
//! evaluates once over the whole content and translates the two known
//! failure kinds. `include(path)` inside a template re-enters
//! [`Renderer::render_file`] with the caller's data.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use minijinja::{Error as EvalFailure, ErrorKind, Value};
use tracing::debug;

use crate::bindings::{Bindings, Data};
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::evaluator::{Evaluator, MiniJinjaEvaluator};
use crate::report::NO_PATH;
use crate::store::TemplateStore;

/// Where a template's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateRef {
    /// Template file, relative or absolute
    Path(PathBuf),
    /// Content supplied directly, with an optional name for diagnostics
    Inline {
        content: String,
        path_hint: Option<String>,
    },
}

impl TemplateRef {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        TemplateRef::Path(path.into())
    }

    pub fn inline(content: impl Into<String>) -> Self {
        TemplateRef::Inline {
            content: content.into(),
            path_hint: None,
        }
    }

    /// Attach a diagnostic name to inline content; no effect on paths
    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        match self {
            TemplateRef::Inline { content, .. } => TemplateRef::Inline {
                content,
                path_hint: Some(hint.into()),
            },
            path => path,
        }
    }
}

/// Renders templates against caller data.
///
/// Cheap to clone: clones share the template store and the evaluator.
#[derive(Clone)]
pub struct Renderer {
    store: Arc<TemplateStore>,
    evaluator: Arc<dyn Evaluator>,
    max_include_depth: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Renderer with default settings and its own empty store
    pub fn new() -> Self {
        Self::from_config(&RenderConfig::default())
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        let store = match &config.root {
            Some(root) => TemplateStore::with_root(root),
            None => TemplateStore::new(),
        };
        Self {
            store: Arc::new(store),
            evaluator: Arc::new(MiniJinjaEvaluator::new(config.strict_undefined)),
            max_include_depth: config.max_include_depth,
        }
    }

    /// Renderer over an existing store and evaluator
    pub fn with_parts(store: Arc<TemplateStore>, evaluator: Arc<dyn Evaluator>) -> Self {
        Self {
            store,
            evaluator,
            max_include_depth: RenderConfig::default().max_include_depth,
        }
    }

    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn max_include_depth(&self) -> usize {
        self.max_include_depth
    }

    /// Render `content` directly. Known failures come back as diagnostic text.
    pub fn render(&self, content: &str, data: &Data, path_hint: Option<&str>) -> String {
        self.try_render(content, data, path_hint)
            .unwrap_or_else(|err| err.to_string())
    }

    /// Load and render the template at `path`. Known failures come back as diagnostic text.
    pub fn render_file(&self, path: impl AsRef<Path>, data: &Data) -> String {
        self.try_render_file(path, data)
            .unwrap_or_else(|err| err.to_string())
    }

    /// Render either kind of [`TemplateRef`]
    pub fn render_ref(&self, template: &TemplateRef, data: &Data) -> String {
        self.try_render_ref(template, data)
            .unwrap_or_else(|err| err.to_string())
    }

    /// Like [`render`](Self::render) but keeps the structured error
    pub fn try_render(
        &self,
        content: &str,
        data: &Data,
        path_hint: Option<&str>,
    ) -> Result<String, RenderError> {
        self.render_at(content, data, path_hint, 0)
    }

    /// Like [`render_file`](Self::render_file) but keeps the structured error
    pub fn try_render_file(&self, path: impl AsRef<Path>, data: &Data) -> Result<String, RenderError> {
        self.render_file_at(path.as_ref(), data, 0)
    }

    pub fn try_render_ref(&self, template: &TemplateRef, data: &Data) -> Result<String, RenderError> {
        match template {
            TemplateRef::Path(path) => self.try_render_file(path, data),
            TemplateRef::Inline { content, path_hint } => {
                self.try_render(content, data, path_hint.as_deref())
            }
        }
    }

    fn render_file_at(&self, path: &Path, data: &Data, depth: usize) -> Result<String, RenderError> {
        let content = self.store.load(path)?;
        let hint = path.display().to_string();
        self.render_at(&content, data, Some(&hint), depth)
    }

    fn render_at(
        &self,
        content: &str,
        data: &Data,
        path_hint: Option<&str>,
        depth: usize,
    ) -> Result<String, RenderError> {
        debug!(path = path_hint.unwrap_or(NO_PATH), depth, "rendering template");
        let bindings = Bindings::build(data, self.include_fn(data, depth));

        self.evaluator
            .evaluate(content, path_hint.unwrap_or(NO_PATH), &bindings)
            .map_err(|source| RenderError::RenderFailure {
                content: Arc::from(content),
                path: path_hint.map(str::to_string),
                source,
            })
    }

    /// The `include(path)` function bound for a template rendered at `depth`.
    ///
    /// Nested failures are rendered as diagnostic text in place, the same as
    /// [`render_file`](Self::render_file). Going past the depth limit fails
    /// the calling template.
    fn include_fn(&self, data: &Data, depth: usize) -> Value {
        let renderer = self.clone();
        let data = data.clone();

        Value::from_function(move |path: String| -> Result<String, EvalFailure> {
            let next = depth + 1;
            if next > renderer.max_include_depth {
                return Err(EvalFailure::new(
                    ErrorKind::InvalidOperation,
                    format!(
                        "include depth limit of {} exceeded while including \"{}\"",
                        renderer.max_include_depth, path
                    ),
                ));
            }
            debug!(path = %path, depth = next, "including template");
            Ok(renderer
                .render_file_at(Path::new(&path), &data, next)
                .unwrap_or_else(|err| err.to_string()))
        })
    }
}
