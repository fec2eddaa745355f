//! Repeated Starlark blocks spliced into `rocm/BUILD`.
//!
//! Rendered with tera; every `{{ value }}` is escaped as the body of a
//! Starlark string literal.

use std::error::Error as _;
use std::sync::LazyLock;

use serde::Serialize;
use tera::Tera;

use crate::errors::{ConfigResult, ConfigurationError};

pub const ROCM_LIBRARIES_FRAGMENT: &str = "rocm_libraries.bzl";
pub const COPY_RULES_FRAGMENT: &str = "copy_rules.bzl";

static FRAGMENTS: LazyLock<Tera> = LazyLock::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (
            ROCM_LIBRARIES_FRAGMENT,
            include_str!("templates/rocm_libraries.bzl"),
        ),
        (COPY_RULES_FRAGMENT, include_str!("templates/copy_rules.bzl")),
    ])
    .expect("embedded fragment templates");
    tera.autoescape_on(vec![".bzl"]);
    tera.set_escape_fn(escape_starlark_string);
    tera
});

/// Escape `s` for use between the quotes of a Starlark string.
pub fn escape_starlark_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// Render a fragment. Blocks are blank-line separated and the result ends
/// with exactly one newline, or is empty when there is nothing to declare.
pub fn render_fragment<C: Serialize>(name: &str, context: &C) -> ConfigResult<String> {
    let render_error = |e: tera::Error| {
        let mut message = e.to_string();
        let mut source = e.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ConfigurationError::Render {
            template: name.to_string(),
            message,
        }
    };

    let context = tera::Context::from_serialize(context).map_err(render_error)?;
    let rendered = FRAGMENTS.render(name, &context).map_err(render_error)?;

    let trimmed = rendered.trim_end();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("{}\n", trimmed))
}
