//! Expression evaluation boundary
//!
//! The renderer never parses `${...}` spans itself. It hands the whole
//! template to an [`Evaluator`] together with the bindings and gets back one
//! string or one error. The default implementation is MiniJinja configured so
//! that expression spans use `${` and `}`; `{% for %}` / `{% if %}` blocks
//! and `{# #}` comments are its own iteration, branching and comment forms.
//!
//! Because of that, `{%` and `{#` are reserved in template text. Literal
//! occurrences must be escaped, either as `${ '{%' }` or by wrapping the text
//! in `{% raw %}...{% endraw %}`. Everything else, including `{{`, lone `}`
//! and `$`, passes through unchanged.
//!
//! Values print in the evaluator's natural form: booleans are `True` and
//! `False`, sequences print as `[1, 2]`.

use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use once_cell::sync::Lazy;
use tracing::{trace, warn};

use crate::bindings::Bindings;
use crate::error::EvalError;

/// Start marker of an expression span
pub const EXPR_START: &str = "${";
/// End marker of an expression span
pub const EXPR_END: &str = "}";

/// Delimiter set shared by every evaluator. A rejected set is kept as its
/// message and reported on each evaluation.
static SYNTAX: Lazy<Result<SyntaxConfig, String>> = Lazy::new(|| {
    SyntaxConfig::builder()
        .block_delimiters("{%", "%}")
        .variable_delimiters(EXPR_START, EXPR_END)
        .comment_delimiters("{#", "#}")
        .build()
        .map_err(|err| {
            warn!(error = %err, "expression delimiters rejected");
            err.to_string()
        })
});

/// Evaluates a whole template against a binding set in isolation.
///
/// Implementations must only expose `bindings` to the template: no ambient
/// globals, no file system access.
pub trait Evaluator: Send + Sync {
    /// Render `source` in one pass. `name` identifies it in evaluator errors.
    fn evaluate(&self, source: &str, name: &str, bindings: &Bindings) -> Result<String, EvalError>;
}

/// MiniJinja-backed evaluator
pub struct MiniJinjaEvaluator {
    env: Environment<'static>,
    syntax_error: Option<String>,
}

impl Default for MiniJinjaEvaluator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MiniJinjaEvaluator {
    /// Create an evaluator.
    ///
    /// With `strict_undefined`, referencing a name missing from the bindings
    /// fails the render instead of printing nothing.
    pub fn new(strict_undefined: bool) -> Self {
        let mut env = Environment::new();
        let syntax_error = match SYNTAX.as_ref() {
            Ok(syntax) => {
                env.set_syntax(syntax.clone());
                None
            }
            Err(message) => Some(message.clone()),
        };
        // Output is raw text whatever the file extension
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(if strict_undefined {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });
        Self { env, syntax_error }
    }
}

impl Evaluator for MiniJinjaEvaluator {
    fn evaluate(&self, source: &str, name: &str, bindings: &Bindings) -> Result<String, EvalError> {
        trace!(name, bytes = source.len(), "evaluating template");
        if let Some(message) = &self.syntax_error {
            return Err(EvalError::new("SyntaxError", message.as_str()));
        }
        self.env
            .render_named_str(name, source, bindings.to_value())
            .map_err(EvalError::from)
    }
}
