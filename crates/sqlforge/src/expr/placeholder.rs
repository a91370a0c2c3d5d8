use std::fmt;

/// A named stand-in for a value slot that has not been supplied yet.
///
/// Rendering a composition that still contains a placeholder fails with
/// [`QueryError::UnresolvedPlaceholder`](crate::QueryError::UnresolvedPlaceholder).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    name: String,
}

impl Placeholder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.name)
    }
}
