//! Fluent construction of [`CompiledQuery`] values.
//!
//! The builder never fails: values that cannot be represented as JSON become
//! `null` (and therefore never match), and malformed link/operand sequences
//! are only reported when a backend evaluates them.

use serde::Serialize;
use serde_json::Value as Json;
use tracing::warn;

use super::ast::{
    CompiledQuery, DateOptions, Link, PredicateToken, PropertyOptions, SortOrder, SortSpec,
    Symbol, Token,
};

/// Start a fresh query.
pub fn query_builder() -> QueryBuilder {
    QueryBuilder::new()
}

/// Accumulates tokens plus sort / take / page.
///
/// # Example
///
/// ```
/// use models::mql::{query_builder, PropertyOptions, Symbol, SortOrder};
///
/// let query = query_builder()
///     .property("name", "Alice")
///     .and_()
///     .complex(|b| {
///         b.property_with("age", 30, PropertyOptions::number().symbol(Symbol::Gt))
///             .or_()
///             .property_with("active", true, PropertyOptions::boolean())
///     })
///     .sort("age", SortOrder::Dsc)
///     .take(10)
///     .compile();
///
/// assert_eq!(query.tokens.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    tokens: Vec<Token>,
    sort: Option<SortSpec>,
    take: Option<usize>,
    page: Option<Json>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate with default options (object equality).
    pub fn property(self, name: &str, value: impl Serialize) -> Self {
        self.property_with(name, value, PropertyOptions::default())
    }

    pub fn property_with(
        mut self,
        name: &str,
        value: impl Serialize,
        options: PropertyOptions,
    ) -> Self {
        self.tokens.push(Token::Predicate(PredicateToken {
            property: name.to_string(),
            value: to_json(name, value),
            options,
        }));
        self
    }

    pub fn and_(mut self) -> Self {
        self.tokens.push(Token::Link(Link::And));
        self
    }

    pub fn or_(mut self) -> Self {
        self.tokens.push(Token::Link(Link::Or));
        self
    }

    /// Build a parenthesised sub-expression on a fresh builder and append it
    /// as a single group operand. Only the sub-builder's tokens are kept.
    pub fn complex<F>(mut self, build: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        let inner = build(QueryBuilder::new());
        self.tokens.push(Token::Group(inner.tokens));
        self
    }

    /// `name >= value` (or `>` when not inclusive), compared as instants.
    pub fn dates_after(self, name: &str, value: impl Serialize) -> Self {
        self.dates_after_with(name, value, DateOptions::default())
    }

    pub fn dates_after_with(self, name: &str, value: impl Serialize, opts: DateOptions) -> Self {
        let symbol = if opts.inclusive { Symbol::Gte } else { Symbol::Gt };
        self.date_bound(name, value, opts, symbol)
    }

    /// `name <= value` (or `<` when not inclusive), compared as instants.
    pub fn dates_before(self, name: &str, value: impl Serialize) -> Self {
        self.dates_before_with(name, value, DateOptions::default())
    }

    pub fn dates_before_with(self, name: &str, value: impl Serialize, opts: DateOptions) -> Self {
        let symbol = if opts.inclusive { Symbol::Lte } else { Symbol::Lt };
        self.date_bound(name, value, opts, symbol)
    }

    fn date_bound(
        self,
        name: &str,
        value: impl Serialize,
        opts: DateOptions,
        symbol: Symbol,
    ) -> Self {
        let mut options = PropertyOptions::typed(opts.value_type).symbol(symbol);
        options.date_bound = true;
        self.property_with(name, value, options)
    }

    /// Last call wins.
    pub fn sort(mut self, name: &str, order: SortOrder) -> Self {
        self.sort = Some(SortSpec {
            property: name.to_string(),
            order,
        });
        self
    }

    /// Last call wins.
    pub fn take(mut self, n: usize) -> Self {
        self.take = Some(n);
        self
    }

    /// Opaque pagination token handed back verbatim by `search`.
    pub fn page(mut self, page: impl Serialize) -> Self {
        self.page = Some(to_json("page", page));
        self
    }

    /// Snapshot the current state. The builder stays usable afterwards.
    pub fn compile(&self) -> CompiledQuery {
        CompiledQuery {
            tokens: self.tokens.clone(),
            sort: self.sort.clone(),
            take: self.take,
            page: self.page.clone(),
        }
    }
}

fn to_json(name: &str, value: impl Serialize) -> Json {
    serde_json::to_value(value).unwrap_or_else(|err| {
        warn!(property = name, "value is not representable as JSON, using null: {err}");
        Json::Null
    })
}
