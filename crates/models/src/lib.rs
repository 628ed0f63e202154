pub mod mql;
pub mod store;

use mql::QueryError;
use thiserror::Error;

pub use mql::{query_builder, CompiledQuery, QueryBuilder};
pub use store::factory::{create_factory, DefaultModelFactory, ModelFactory};
pub use store::mem::MemoryBackend;
pub use store::{ModelBackend, ModelDefinition, Record, SearchResult};

#[derive(Debug, Error)]
pub enum Error {
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// `update` against a primary key the bucket does not hold.
    #[error("{model} has no instance with primary key {key}")]
    NotFound { model: String, key: String },

    /// Storage-level failure, e.g. an exhausted key counter.
    #[error("backend error: {0}")]
    Backend(String),
}

impl Error {
    #[inline]
    pub fn not_found(model: &ModelDefinition, key: &serde_json::Value) -> Self {
        Error::NotFound {
            model: model.to_string(),
            key: key.to_string(),
        }
    }

    #[inline]
    pub fn backend(msg: impl Into<String>) -> Self {
        Error::Backend(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Error::Query(QueryError::InvalidStructure { .. }))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
