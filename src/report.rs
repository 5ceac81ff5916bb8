//! Diagnostic text for render failures
//!
//! Both messages are meant for humans reading a page or a terminal, not for
//! parsing. The render failure message echoes the whole template between
//! separators so the failing expression can be found by eye.

use std::io;
use std::path::Path;

use crate::error::EvalError;

/// Shown instead of a path when raw content fails without a hint
pub const NO_PATH: &str = "<no path>";

const SEPARATOR: &str = "=======";

/// Message for a template file that could not be read.
pub fn not_found_message(absolute_path: &Path, cause: &io::Error) -> String {
    format!(
        "The \"{name}\" file could not be found.\n  \
         Resolved path:  {path}\n\n  \
         Error message:  {message}\n  \
         Error code:     {kind:?}\n",
        name = base_name(absolute_path),
        path = absolute_path.display(),
        message = cause,
        kind = cause.kind(),
    )
}

/// Message for a template that was found but failed during evaluation.
pub fn render_failure_message(path: Option<&str>, content: &str, cause: &EvalError) -> String {
    let shown = path.unwrap_or(NO_PATH);
    let name = match path {
        Some(p) => base_name(Path::new(p)),
        None => NO_PATH.to_string(),
    };

    format!(
        "The \"{shown}\" was found but could not be executed.\n  \
         Error message:  {message}\n  \
         Error code:     {kind}\n\n  \
         {name}:\n  \
         {SEPARATOR}\n\
         {content}\n  \
         {SEPARATOR}\n",
        message = cause.message(),
        kind = cause.kind(),
    )
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
