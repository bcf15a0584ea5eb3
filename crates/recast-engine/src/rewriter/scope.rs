//! Explicit lexical scope tracking

/// Stack of enclosing named scopes, innermost last
///
/// The stack is threaded through the traversal by `&mut`, so entering and leaving a scope are
/// paired explicitly and nothing outlives the definition that pushed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeStack {
    frames: Vec<String>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.frames.push(name.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.frames.pop()
    }

    /// Innermost scope name; `None` at module level
    pub fn current(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Dotted path of the enclosing scopes, `<module>` at top level
    pub fn path(&self) -> String {
        if self.frames.is_empty() {
            "<module>".to_string()
        } else {
            self.frames.join(".")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_restores_outer_scope() {
        let mut stack = ScopeStack::new();
        assert_eq!(stack.current(), None);
        assert_eq!(stack.path(), "<module>");

        stack.push("Outer");
        stack.push("method");
        assert_eq!(stack.current(), Some("method"));
        assert_eq!(stack.path(), "Outer.method");
        assert_eq!(stack.depth(), 2);

        assert_eq!(stack.pop().as_deref(), Some("method"));
        assert_eq!(stack.current(), Some("Outer"));
        stack.pop();
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);
    }
}
