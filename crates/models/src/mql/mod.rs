pub mod ast;
pub mod compare;
pub mod error;
pub mod eval;
pub mod order;
pub mod query;

pub use ast::{
    CompiledQuery, DataType, DateOptions, Link, PredicateToken, PropertyOptions, SortOrder,
    SortSpec, Symbol, Token,
};
pub use error::QueryError;
pub use eval::{evaluate, validate};
pub use order::apply_sort;
pub use query::{query_builder, QueryBuilder};
