//! `%{name}` placeholder templates.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::errors::{ConfigResult, ConfigurationError};

/// Placeholder name to replacement text.
pub type Substitutions = BTreeMap<String, String>;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex"));

/// An embedded text template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    /// Name used in error messages (the output path).
    pub name: &'static str,
    pub text: &'static str,
}

impl Template {
    pub const fn new(name: &'static str, text: &'static str) -> Self {
        Template { name, text }
    }

    /// Every placeholder the template uses.
    pub fn placeholders(&self) -> BTreeSet<&'static str> {
        PLACEHOLDER
            .captures_iter(self.text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect()
    }

    /// Check that `subs` covers every placeholder.
    pub fn verify(&self, subs: &Substitutions) -> ConfigResult<()> {
        let missing: Vec<String> = self
            .placeholders()
            .into_iter()
            .filter(|name| !subs.contains_key(*name))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        Err(ConfigurationError::MissingPlaceholders {
            template: self.name.to_string(),
            missing,
            supplied: subs.keys().cloned().collect(),
        })
    }

    /// Verify, then substitute in a single pass.
    ///
    /// Replacement text is inserted verbatim; placeholders inside it are not
    /// expanded again. Keys the template does not use are ignored.
    pub fn render(&self, subs: &Substitutions) -> ConfigResult<String> {
        self.verify(subs)?;

        let rendered = PLACEHOLDER.replace_all(self.text, |caps: &Captures<'_>| {
            subs.get(&caps[1]).cloned().unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }
}
