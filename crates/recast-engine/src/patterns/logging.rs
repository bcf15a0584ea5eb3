//! `print()` to `logging.info()` rules

use super::imports::{ImportPlan, ImportRequirement};
use super::{CallSite, RewriteRules};
use crate::providers::TransformerMetadata;
use once_cell::sync::Lazy;
use recast_parsers::{NodeBuilder, SyntaxNode};
use regex::Regex;

static PRINT_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bprint\s*\(").expect("Invalid regex"));

/// Rewrites `print(...)` to `logging.info(...)`
///
/// Several arguments become a `%s` format string so the logged line matches what `print` would
/// have written. Calls with keyword or splat arguments (`file=`, `sep=`, `end=`, `flush=`) are
/// left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintToLoggingRules;

impl RewriteRules for PrintToLoggingRules {
    fn metadata(&self) -> TransformerMetadata {
        TransformerMetadata::new("print-to-logging", "Replace print() calls with logging.info()")
    }

    fn can_handle(&self, source: &str) -> bool {
        PRINT_CALL.is_match(source)
    }

    fn rewrite_call(&self, site: &CallSite<'_>) -> Option<SyntaxNode> {
        if site.callee_path()? != "print" {
            return None;
        }
        let args = site.positional_arguments()?;

        let mut forwarded: Vec<SyntaxNode> = args.iter().map(|arg| (*arg).clone()).collect();
        match forwarded.len() {
            0 => forwarded.push(SyntaxNode::token("string", "''")),
            1 => {}
            n => {
                let format = vec!["%s"; n].join(" ");
                forwarded.insert(0, SyntaxNode::token("string", format!("'{}'", format)));
            }
        }
        let info = NodeBuilder::attribute(NodeBuilder::identifier("logging"), "info");
        Some(NodeBuilder::call(info, forwarded))
    }

    fn imports(&self) -> ImportPlan {
        ImportPlan::new(ImportRequirement::module("logging"))
    }
}
