//! `os.path` to `pathlib.Path` migration rules

use super::imports::{ImportPlan, ImportRequirement, LegacyImport};
use super::{is_positional, CallSite, RewriteRules};
use crate::providers::TransformerMetadata;
use crate::recipe::value::decode_string;
use once_cell::sync::Lazy;
use recast_parsers::{NodeBuilder, SyntaxNode};
use regex::Regex;
use std::collections::HashMap;

/// How one `os.path` member maps onto `Path`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathRule {
    /// `Path(a) / b / c`
    Join,
    /// `Path(a).<method>()`
    Method(&'static str),
    /// `Path(a).<attribute>`
    Attribute(&'static str),
    /// `Path(a).stat().st_size`
    StatSize,
}

static PATH_RULES: Lazy<HashMap<&'static str, PathRule>> = Lazy::new(|| {
    HashMap::from([
        ("join", PathRule::Join),
        ("exists", PathRule::Method("exists")),
        ("isfile", PathRule::Method("is_file")),
        ("isdir", PathRule::Method("is_dir")),
        ("islink", PathRule::Method("is_symlink")),
        ("isabs", PathRule::Method("is_absolute")),
        ("abspath", PathRule::Method("resolve")),
        ("expanduser", PathRule::Method("expanduser")),
        ("getsize", PathRule::StatSize),
        ("basename", PathRule::Attribute("name")),
        ("dirname", PathRule::Attribute("parent")),
    ])
});

static LEGACY_USAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"os\.path\.|from os\.path import|import os\.path").expect("Invalid regex")
});

/// Substrings that make a variable name look like it holds a path
const PATH_KEYWORDS: &[&str] = &["path", "file", "dir", "folder"];

/// Rewrites `os.path` calls and path-like `open()` calls to `pathlib.Path`
#[derive(Debug, Clone, Copy, Default)]
pub struct PathlibRules;

impl PathlibRules {
    fn rewrite_legacy(member: &str, site: &CallSite<'_>) -> Option<SyntaxNode> {
        let rule = *PATH_RULES.get(member)?;
        let args = site.positional_arguments()?;

        match (rule, args.as_slice()) {
            (PathRule::Join, [first, rest @ ..]) => {
                let mut chain = path_of(first);
                for arg in rest {
                    chain = NodeBuilder::binary_operator(chain, "/", NodeBuilder::operand((*arg).clone()));
                }
                Some(chain)
            }
            (PathRule::Method(method), [arg]) => Some(NodeBuilder::call(
                NodeBuilder::attribute(path_of(arg), method),
                Vec::new(),
            )),
            (PathRule::Attribute(attribute), [arg]) => {
                Some(NodeBuilder::attribute(path_of(arg), attribute))
            }
            (PathRule::StatSize, [arg]) => Some(NodeBuilder::attribute(
                NodeBuilder::call(NodeBuilder::attribute(path_of(arg), "stat"), Vec::new()),
                "st_size",
            )),
            _ => None,
        }
    }

    /// `open(p, ...)` with a path-like first argument becomes `Path(p).open(...)`
    fn rewrite_open(site: &CallSite<'_>) -> Option<SyntaxNode> {
        let args = site.arguments()?;
        let (first, rest) = args.split_first()?;
        if !is_positional(first) || !looks_like_path(first) {
            return None;
        }
        if rest
            .iter()
            .any(|arg| matches!(arg.kind(), "list_splat" | "dictionary_splat" | "parenthesized_list_splat"))
        {
            return None;
        }
        Some(NodeBuilder::call(
            NodeBuilder::attribute(path_of(first), "open"),
            rest.iter().map(|arg| (*arg).clone()).collect(),
        ))
    }
}

impl RewriteRules for PathlibRules {
    fn metadata(&self) -> TransformerMetadata {
        TransformerMetadata::new(
            "pathlib",
            "Convert os.path calls and path-like open() calls to pathlib.Path",
        )
    }

    fn can_handle(&self, source: &str) -> bool {
        LEGACY_USAGE.is_match(source)
    }

    fn rewrite_call(&self, site: &CallSite<'_>) -> Option<SyntaxNode> {
        let callee = site.callee_path()?;
        if let Some(member) = callee.strip_prefix("os.path.") {
            Self::rewrite_legacy(member, site)
        } else if callee == "open" {
            Self::rewrite_open(site)
        } else {
            None
        }
    }

    fn imports(&self) -> ImportPlan {
        ImportPlan::new(ImportRequirement::from_import("pathlib", "Path"))
            .retiring(LegacyImport::new("os.path"))
    }
}

/// `Path(<expr>)`
fn path_of(argument: &SyntaxNode) -> SyntaxNode {
    NodeBuilder::call(NodeBuilder::identifier("Path"), vec![argument.clone()])
}

fn looks_like_path(argument: &SyntaxNode) -> bool {
    match argument.kind() {
        "string" => {
            let raw = argument.text();
            let value = decode_string(&raw).unwrap_or(raw);
            value.contains('/') || value.contains('\\')
        }
        "identifier" => {
            let name = argument.text().to_lowercase();
            PATH_KEYWORDS.iter().any(|keyword| name.contains(keyword))
        }
        _ => false,
    }
}
