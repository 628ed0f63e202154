pub mod factory;
pub mod mem;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::fmt::{Display, Formatter};

use crate::mql::CompiledQuery;
use crate::Result;

/// A stored instance: field name to value, primary key included.
pub type Record = Map<String, Json>;

fn default_primary_key() -> String {
    "id".to_string()
}

/// Identity of a model as seen by a backend.
///
/// `(domain, plural_name)` selects the bucket; `primary_key_name` names the
/// key field inside each record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub domain: String,
    pub plural_name: String,
    #[serde(default = "default_primary_key")]
    pub primary_key_name: String,
}

impl ModelDefinition {
    pub fn new(domain: impl Into<String>, plural_name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            plural_name: plural_name.into(),
            primary_key_name: default_primary_key(),
        }
    }

    pub fn with_primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key_name = name.into();
        self
    }
}

impl Display for ModelDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.domain, self.plural_name)
    }
}

/// Output of [`ModelBackend::search`]. `page` is the query's page, untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub instances: Vec<Record>,
    pub page: Option<Json>,
}

/// The operation set any storage engine implements to serve a model.
///
/// Records cross this boundary by value: a backend takes ownership of what
/// it stores and hands out copies, so callers can never alias its state.
pub trait ModelBackend {
    /// Store `data`, assigning a primary key when the field is absent.
    fn create(&mut self, model: &ModelDefinition, data: Record) -> Result<Record>;

    fn retrieve(&self, model: &ModelDefinition, pk: &Json) -> Result<Option<Record>>;

    /// Shallow-merge `partial` over the stored record. Fails with
    /// [`Error::NotFound`](crate::Error::NotFound) when `pk` is unknown.
    fn update(&mut self, model: &ModelDefinition, pk: &Json, partial: Record) -> Result<Record>;

    /// Removing an unknown key is a no-op.
    fn delete(&mut self, model: &ModelDefinition, pk: &Json) -> Result<()>;

    /// Filter, sort and truncate. Structural query errors are returned as-is.
    fn search(&self, model: &ModelDefinition, query: &CompiledQuery) -> Result<SearchResult>;

    /// Drop everything this backend instance holds.
    fn dispose(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_definition_defaults_primary_key() {
        let m: ModelDefinition =
            serde_json::from_value(json!({ "domain": "shop", "plural_name": "orders" })).unwrap();
        assert_eq!(m, ModelDefinition::new("shop", "orders"));
        assert_eq!(m.primary_key_name, "id");
        assert_eq!(m.to_string(), "shop/orders");
    }

    #[test]
    fn search_result_serializes_page_verbatim() {
        let r = SearchResult {
            instances: vec![],
            page: Some(json!({ "cursor": "abc" })),
        };
        assert_eq!(
            serde_json::to_value(r).unwrap(),
            json!({ "instances": [], "page": { "cursor": "abc" } })
        );
    }
}
