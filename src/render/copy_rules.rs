//! Declarations of toolkit files staged into the generated repository.
//!
//! Nothing here copies anything. Each [`CopyRule`] becomes a Bazel rule in
//! `rocm/BUILD` that copies at build time.

use std::path::PathBuf;

use serde::Serialize;

use crate::errors::ConfigResult;
use crate::probe::ToolchainFacts;

use super::fragments::{render_fragment, COPY_RULES_FRAGMENT};
use super::substitutions::{library_target_name, shell_single_quoted};

/// What a copy rule stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyKind {
    /// The toolkit include tree.
    Headers,
    /// One resolved library.
    Library,
    /// One toolkit executable.
    Binary,
}

/// One file or directory to copy, with destination relative to the
/// generated repository root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyRule {
    pub kind: CopyKind,
    /// Bazel target name.
    pub name: String,
    pub source: PathBuf,
    pub destination: String,
}

const CLANG_OFFLOAD_BUNDLER: &str = "clang-offload-bundler";

/// Copy rules for a probed toolchain: headers, then libraries, then the
/// offload bundler.
pub fn copy_rules(facts: &ToolchainFacts) -> Vec<CopyRule> {
    let mut rules = vec![CopyRule {
        kind: CopyKind::Headers,
        name: "rocm-include".to_string(),
        source: facts.toolkit_path.join("include"),
        destination: "rocm/include".to_string(),
    }];

    for (name, lib) in &facts.resolved_libraries {
        rules.push(CopyRule {
            kind: CopyKind::Library,
            name: format!("rocm-lib-{}", library_target_name(name)),
            source: lib.path.clone(),
            destination: format!("rocm/lib/{}", lib.file_name),
        });
    }

    rules.push(CopyRule {
        kind: CopyKind::Binary,
        name: format!("rocm-bin-{}", CLANG_OFFLOAD_BUNDLER),
        source: facts
            .toolkit_path
            .join("llvm")
            .join("bin")
            .join(CLANG_OFFLOAD_BUNDLER),
        destination: format!("rocm/bin/{}", CLANG_OFFLOAD_BUNDLER),
    });

    rules
}

#[derive(Serialize)]
struct RuleBlock<'a> {
    kind: CopyKind,
    name: &'a str,
    source: String,
    destination: &'a str,
    cmd: String,
}

#[derive(Serialize)]
struct RuleBlocks<'a> {
    rules: Vec<RuleBlock<'a>>,
}

impl CopyRule {
    fn block(&self) -> RuleBlock<'_> {
        let source = self.source.display().to_string();
        RuleBlock {
            kind: self.kind,
            name: &self.name,
            cmd: format!("cp -f '{}' $@", shell_single_quoted(&source)),
            source,
            destination: &self.destination,
        }
    }
}

/// All rules, blank-line separated.
pub fn render_copy_rules(rules: &[CopyRule]) -> ConfigResult<String> {
    let rules = rules.iter().map(CopyRule::block).collect();
    render_fragment(COPY_RULES_FRAGMENT, &RuleBlocks { rules })
}
