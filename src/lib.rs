//! templated-views - minimal template rendering
//!
//! Templates are plain text with `${ expr }` spans. Expressions, loops and
//! conditionals are evaluated by an embedded expression engine; this crate
//! only orchestrates: it loads and caches template files, binds caller data
//! plus an `include(path)` function, and turns failures into readable
//! diagnostics.
//!
//! `{%` and `{#` open the evaluator's block and comment forms, so literal
//! text containing them is written as `${ '{%' }` or inside
//! `{% raw %}...{% endraw %}`.
//!
//! ```no_run
//! use templated_views::{render, render_file, Data};
//!
//! let data: Data = [("name", "marcus")].into_iter().collect();
//! assert_eq!(render("<div>${ name | upper }</div>", &data, None), "<div>MARCUS</div>");
//!
//! // Missing files and failing expressions come back as diagnostic text
//! let page = render_file("views/page.html", &data);
//! ```

pub mod bindings;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod renderer;
pub mod report;
pub mod store;

use std::path::Path;

use once_cell::sync::Lazy;
use tracing::warn;

pub use bindings::{Bindings, Data};
pub use config::RenderConfig;
pub use error::{ConfigError, DataError, EvalError, FixSuggestion, RenderError};
pub use evaluator::{Evaluator, MiniJinjaEvaluator};
pub use renderer::{Renderer, TemplateRef};
pub use store::TemplateStore;

// Re-export minijinja Value for caller data and functions
pub use minijinja::{context, Value};

/// Process-wide renderer behind the free functions
static DEFAULT_RENDERER: Lazy<Renderer> = Lazy::new(|| {
    let config = RenderConfig::from_env().unwrap_or_else(|err| {
        warn!(error = %err, "ignoring invalid environment configuration");
        RenderConfig::default()
    });
    Renderer::from_config(&config)
});

/// The renderer (and template cache) shared by [`render`] and [`render_file`]
pub fn default_renderer() -> &'static Renderer {
    &DEFAULT_RENDERER
}

/// Render template content with the process-wide renderer
pub fn render(content: &str, data: &Data, path_hint: Option<&str>) -> String {
    DEFAULT_RENDERER.render(content, data, path_hint)
}

/// Render a template file with the process-wide renderer
pub fn render_file(path: impl AsRef<Path>, data: &Data) -> String {
    DEFAULT_RENDERER.render_file(path, data)
}
