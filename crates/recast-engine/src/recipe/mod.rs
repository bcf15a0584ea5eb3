//! Recipe model: ordered, declarative rewrite instructions
//!
//! A [`Recipe`] is immutable once built. It serializes as a plain list of instruction records
//! with the fields `kind`, `target`, `replacement`, `position` and `scope`.

pub mod exporter;
pub mod validator;
pub mod value;

pub use exporter::RecipeExporter;
pub use validator::RecipeValidator;
pub use value::Value;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Scope name that matches every enclosing scope
pub const GLOBAL_SCOPE: &str = "global";

/// What an instruction does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionKind {
    Substitution,
    Insertion,
    Deletion,
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionKind::Substitution => write!(f, "substitution"),
            InstructionKind::Insertion => write!(f, "insertion"),
            InstructionKind::Deletion => write!(f, "deletion"),
        }
    }
}

/// Where an insertion places its statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    /// First statements of the scope body
    Start,
    /// Last statements of the scope body
    End,
    /// Sibling statements just before the scope's definition
    Before,
    /// Sibling statements just after the scope's definition
    After,
}

impl fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertPosition::Start => write!(f, "start"),
            InsertPosition::End => write!(f, "end"),
            InsertPosition::Before => write!(f, "before"),
            InsertPosition::After => write!(f, "after"),
        }
    }
}

fn default_scope() -> String {
    GLOBAL_SCOPE.to_string()
}

/// A single rewrite instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    kind: InstructionKind,
    #[serde(default)]
    target: Option<Value>,
    #[serde(default)]
    replacement: Option<Value>,
    #[serde(default)]
    position: Option<InsertPosition>,
    #[serde(default = "default_scope")]
    scope: String,
}

impl Instruction {
    /// Replace literals or names equal to `target` with `replacement`
    pub fn substitution(
        target: impl Into<Value>,
        replacement: impl Into<Value>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            kind: InstructionKind::Substitution,
            target: Some(target.into()),
            replacement: Some(replacement.into()),
            position: None,
            scope: scope.into(),
        }
    }

    /// Insert the statements of `code` at `position` relative to `scope`
    pub fn insertion(code: impl Into<String>, position: InsertPosition, scope: impl Into<String>) -> Self {
        Self {
            kind: InstructionKind::Insertion,
            target: None,
            replacement: Some(Value::Str(code.into())),
            position: Some(position),
            scope: scope.into(),
        }
    }

    /// Remove statements matching `target` inside `scope`
    pub fn deletion(target: impl Into<Value>, scope: impl Into<String>) -> Self {
        Self {
            kind: InstructionKind::Deletion,
            target: Some(target.into()),
            replacement: None,
            position: None,
            scope: scope.into(),
        }
    }

    pub fn kind(&self) -> InstructionKind {
        self.kind
    }

    pub fn target(&self) -> Option<&Value> {
        self.target.as_ref()
    }

    pub fn replacement(&self) -> Option<&Value> {
        self.replacement.as_ref()
    }

    pub fn position(&self) -> Option<InsertPosition> {
        self.position
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn is_global(&self) -> bool {
        self.scope == GLOBAL_SCOPE
    }

    /// Whether this instruction may act inside the scope currently on top of the stack
    pub fn applies_in(&self, current_scope: Option<&str>) -> bool {
        self.is_global() || current_scope == Some(self.scope.as_str())
    }

    /// Code fragment of an insertion
    pub fn code(&self) -> Option<&str> {
        self.replacement.as_ref().and_then(Value::as_str)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |value: Option<&Value>| value.map(Value::to_python_literal).unwrap_or_else(|| "-".to_string());
        match self.kind {
            InstructionKind::Substitution => write!(
                f,
                "substitute {} -> {} in {}",
                show(self.target.as_ref()),
                show(self.replacement.as_ref()),
                self.scope
            ),
            InstructionKind::Insertion => write!(
                f,
                "insert at {} of {}",
                self.position.map(|p| p.to_string()).unwrap_or_else(|| "?".to_string()),
                self.scope
            ),
            InstructionKind::Deletion => {
                write!(f, "delete {} in {}", show(self.target.as_ref()), self.scope)
            }
        }
    }
}

/// Ordered sequence of instructions applied in one pass
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe {
    instructions: Vec<Instruction>,
}

impl Recipe {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instructions of one kind, with their index in the recipe
    pub fn of_kind(&self, kind: InstructionKind) -> impl Iterator<Item = (usize, &Instruction)> {
        self.instructions
            .iter()
            .enumerate()
            .filter(move |(_, instruction)| instruction.kind == kind)
    }

    /// Named scopes referenced by the recipe
    pub fn named_scopes(&self) -> BTreeSet<&str> {
        self.instructions
            .iter()
            .filter(|instruction| !instruction.is_global())
            .map(|instruction| instruction.scope())
            .collect()
    }
}

impl FromIterator<Instruction> for Recipe {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
