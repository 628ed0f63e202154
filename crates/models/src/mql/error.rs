use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Links and operands do not alternate; `position` indexes the offending
    /// token (or the list length when the list ends on a link).
    #[error("invalid query structure at token {position}: {reason}")]
    InvalidStructure { position: usize, reason: String },
}

impl QueryError {
    #[inline]
    pub fn structure(position: usize, reason: impl Into<String>) -> Self {
        QueryError::InvalidStructure {
            position,
            reason: reason.into(),
        }
    }
}
