//! Lossless syntax tree types
//!
//! A [`SyntaxTree`] owns every byte of the source it was parsed from. Each leaf token stores the
//! trivia (whitespace, newlines, line continuations) that precedes it, so concatenating the leaves
//! in order reproduces the input exactly. Rewrites build new nodes out of old ones instead of
//! mutating a shared tree.

use serde::{Deserialize, Serialize};

/// Position in source code (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Create a new position
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Create position at start of file
    pub fn zero() -> Self {
        Self::new(0, 0)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1) // 1-based for display
    }
}

/// Range in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Create a new range
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Check if this range contains a position
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeData {
    Token { leading: String, text: String },
    Inner { children: Vec<SyntaxNode> },
}

/// A node of the owned syntax tree
///
/// `kind` and `field` use the grammar's names (`call`, `identifier`, `arguments`, ...).
/// Nodes produced by the parser remember where they started; synthesized nodes do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    kind: &'static str,
    field: Option<&'static str>,
    named: bool,
    position: Option<Position>,
    data: NodeData,
}

impl SyntaxNode {
    /// Create a named leaf token such as an identifier or literal
    pub fn token(kind: &'static str, text: impl Into<String>) -> Self {
        Self {
            kind,
            field: None,
            named: true,
            position: None,
            data: NodeData::Token {
                leading: String::new(),
                text: text.into(),
            },
        }
    }

    /// Create an anonymous token (keyword or punctuation) whose kind is its own text
    pub fn anonymous(text: &'static str) -> Self {
        Self {
            kind: text,
            field: None,
            named: false,
            position: None,
            data: NodeData::Token {
                leading: String::new(),
                text: text.to_string(),
            },
        }
    }

    /// Create an interior node
    pub fn inner(kind: &'static str, children: Vec<SyntaxNode>) -> Self {
        Self {
            kind,
            field: None,
            named: true,
            position: None,
            data: NodeData::Inner { children },
        }
    }

    pub(crate) fn parsed_token(
        kind: &'static str,
        named: bool,
        position: Position,
        leading: String,
        text: String,
    ) -> Self {
        Self {
            kind,
            field: None,
            named,
            position: Some(position),
            data: NodeData::Token { leading, text },
        }
    }

    pub(crate) fn parsed_inner(
        kind: &'static str,
        named: bool,
        position: Position,
        children: Vec<SyntaxNode>,
    ) -> Self {
        Self {
            kind,
            field: None,
            named,
            position: Some(position),
            data: NodeData::Inner { children },
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Field name this node occupies in its parent, if any
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    pub fn is_named(&self) -> bool {
        self.named
    }

    /// Start position in the parsed source; `None` for synthesized nodes
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn is_token(&self) -> bool {
        matches!(self.data, NodeData::Token { .. })
    }

    /// Text of a leaf token, without its leading trivia
    pub fn token_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Token { text, .. } => Some(text),
            NodeData::Inner { .. } => None,
        }
    }

    pub fn children(&self) -> &[SyntaxNode] {
        match &self.data {
            NodeData::Token { .. } => &[],
            NodeData::Inner { children } => children,
        }
    }

    pub fn into_children(self) -> Vec<SyntaxNode> {
        match self.data {
            NodeData::Token { .. } => Vec::new(),
            NodeData::Inner { children } => children,
        }
    }

    /// Rebuild an interior node with new children, keeping kind, field and position
    ///
    /// Tokens are returned unchanged.
    pub fn with_children(self, children: Vec<SyntaxNode>) -> Self {
        match self.data {
            NodeData::Token { .. } => self,
            NodeData::Inner { .. } => Self {
                data: NodeData::Inner { children },
                ..self
            },
        }
    }

    /// Split an interior node into an empty shell and its children
    ///
    /// Pair with [`SyntaxNode::with_children`] to rebuild the node after rewriting the children.
    pub fn into_shell(self) -> (SyntaxNode, Vec<SyntaxNode>) {
        match self.data {
            NodeData::Token { .. } => (self, Vec::new()),
            NodeData::Inner { children } => (
                Self {
                    data: NodeData::Inner {
                        children: Vec::new(),
                    },
                    ..self
                },
                children,
            ),
        }
    }

    pub fn child_by_field(&self, field: &str) -> Option<&SyntaxNode> {
        self.children().iter().find(|c| c.field == Some(field))
    }

    pub fn children_by_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a SyntaxNode> {
        self.children().iter().filter(move |c| c.field == Some(field))
    }

    pub fn named_children(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children().iter().filter(|c| c.named)
    }

    pub fn with_field(mut self, field: Option<&'static str>) -> Self {
        self.field = field;
        self
    }

    /// Trivia in front of the first token of this node
    pub fn leading(&self) -> &str {
        match &self.data {
            NodeData::Token { leading, .. } => leading,
            NodeData::Inner { children } => children.first().map(|c| c.leading()).unwrap_or(""),
        }
    }

    /// Replace the trivia in front of the first token of this node
    pub fn with_leading(self, leading: impl Into<String>) -> Self {
        let leading = leading.into();
        self.map_leading(move |_| leading)
    }

    pub fn map_leading(self, f: impl FnOnce(&str) -> String) -> Self {
        match self.data {
            NodeData::Token { leading, text } => Self {
                data: NodeData::Token {
                    leading: f(&leading),
                    text,
                },
                ..self
            },
            NodeData::Inner { mut children } => {
                if let Some(first) = children.first_mut() {
                    let taken = std::mem::replace(first, SyntaxNode::anonymous(""));
                    *first = taken.map_leading(f);
                }
                Self {
                    data: NodeData::Inner { children },
                    ..self
                }
            }
        }
    }

    /// Indentation of the line this node starts on, when the node starts a line
    pub fn line_indent(&self) -> Option<&str> {
        let leading = self.leading();
        leading.rfind('\n').map(|idx| &leading[idx + 1..])
    }

    /// Prefix `indent` to every line break inside this node's trivia
    ///
    /// Blank lines are left empty. Multi-line string contents are token text and stay untouched.
    pub fn reindent(self, indent: &str) -> Self {
        if indent.is_empty() {
            return self;
        }
        match self.data {
            NodeData::Token { leading, text } => Self {
                data: NodeData::Token {
                    leading: indent_trivia(&leading, indent),
                    text,
                },
                ..self
            },
            NodeData::Inner { children } => Self {
                data: NodeData::Inner {
                    children: children.into_iter().map(|c| c.reindent(indent)).collect(),
                },
                ..self
            },
        }
    }

    /// Append this node's source, including its leading trivia, to `out`
    pub fn write_source(&self, out: &mut String) {
        match &self.data {
            NodeData::Token { leading, text } => {
                out.push_str(leading);
                out.push_str(text);
            }
            NodeData::Inner { children } => {
                for child in children {
                    child.write_source(out);
                }
            }
        }
    }

    /// Source of this node including its leading trivia
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }

    /// Source of this node without its leading trivia
    pub fn text(&self) -> String {
        let source = self.to_source();
        source[self.leading().len()..].to_string()
    }
}

fn indent_trivia(trivia: &str, indent: &str) -> String {
    let mut out = String::with_capacity(trivia.len() + indent.len());
    let mut chars = trivia.chars().peekable();
    while let Some(ch) = chars.next() {
        out.push(ch);
        if ch == '\n' && !matches!(chars.peek(), Some('\n') | Some('\r')) {
            out.push_str(indent);
        }
    }
    out
}

/// Owned syntax tree for one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    root: SyntaxNode,
    trailing: String,
}

impl SyntaxTree {
    /// Create a tree from a root node and the trivia after its last token
    pub fn new(root: SyntaxNode, trailing: impl Into<String>) -> Self {
        Self {
            root,
            trailing: trailing.into(),
        }
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// Trivia after the last token (usually the final newline)
    pub fn trailing(&self) -> &str {
        &self.trailing
    }

    /// Top-level children of the module
    pub fn statements(&self) -> &[SyntaxNode] {
        self.root.children()
    }

    pub fn into_parts(self) -> (SyntaxNode, String) {
        (self.root, self.trailing)
    }
}
