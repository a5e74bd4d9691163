use vodca::{AsRefln, Fromln};

/// Number of rows touched by a single write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Fromln, AsRefln)]
pub struct AffectedRows(u64);

impl AffectedRows {
    pub fn new(rows: impl Into<u64>) -> Self {
        Self(rows.into())
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}
