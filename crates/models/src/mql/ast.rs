use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// The declared type a predicate compares under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Date,
    #[default]
    Object,
}

/// Comparison symbol applied between the stored value and the predicate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    #[default]
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Symbol {
    pub fn as_str(self) -> &'static str {
        match self {
            Symbol::Eq => "eq",
            Symbol::Ne => "ne",
            Symbol::Gt => "gt",
            Symbol::Gte => "gte",
            Symbol::Lt => "lt",
            Symbol::Lte => "lte",
        }
    }

    /// Only `eq` and `ne` make sense for strings, booleans and objects.
    pub fn is_equality(self) -> bool {
        matches!(self, Symbol::Eq | Symbol::Ne)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-predicate comparison options.
///
/// At most one of `starts_with` / `ends_with` / `includes` is honoured; they
/// are checked in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyOptions {
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub equality_symbol: Symbol,
    pub case_sensitive: bool,
    pub starts_with: bool,
    pub ends_with: bool,
    pub includes: bool,
    /// Set by the `dates_*` builders. A date-bound predicate typed `string`
    /// is compared as ordered text instead of as an instant.
    pub date_bound: bool,
}

impl Default for PropertyOptions {
    fn default() -> Self {
        Self {
            data_type: DataType::Object,
            equality_symbol: Symbol::Eq,
            case_sensitive: true,
            starts_with: false,
            ends_with: false,
            includes: false,
            date_bound: false,
        }
    }
}

impl PropertyOptions {
    pub fn typed(data_type: DataType) -> Self {
        Self {
            data_type,
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self::typed(DataType::String)
    }

    pub fn number() -> Self {
        Self::typed(DataType::Number)
    }

    pub fn boolean() -> Self {
        Self::typed(DataType::Boolean)
    }

    pub fn date() -> Self {
        Self::typed(DataType::Date)
    }

    pub fn object() -> Self {
        Self::typed(DataType::Object)
    }

    pub fn symbol(mut self, symbol: Symbol) -> Self {
        self.equality_symbol = symbol;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn starts_with(mut self) -> Self {
        self.starts_with = true;
        self
    }

    pub fn ends_with(mut self) -> Self {
        self.ends_with = true;
        self
    }

    pub fn includes(mut self) -> Self {
        self.includes = true;
        self
    }
}

/// `<property> <symbol> <value>` under the declared options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateToken {
    pub property: String,
    #[serde(default)]
    pub value: Json,
    #[serde(default)]
    pub options: PropertyOptions,
}

/// Boolean link between two operands; encoded as the bare strings `"AND"` / `"OR"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Link {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl Link {
    pub fn combine(self, left: bool, right: bool) -> bool {
        match self {
            Link::And => left && right,
            Link::Or => left || right,
        }
    }
}

/// One element of a compiled query.
///
/// Wire decoding tries each shape in declaration order, so any JSON value
/// that is not a link, a group or a predicate lands in `Unrecognized`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    Link(Link),
    Group(Vec<Token>),
    Predicate(PredicateToken),
    Unrecognized(Json),
}

impl Token {
    pub fn is_link(&self) -> bool {
        matches!(self, Token::Link(_))
    }
}

impl From<PredicateToken> for Token {
    fn from(p: PredicateToken) -> Self {
        Token::Predicate(p)
    }
}

impl From<Link> for Token {
    fn from(l: Link) -> Self {
        Token::Link(l)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Dsc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub property: String,
    pub order: SortOrder,
}

/// Options for `dates_after` / `dates_before`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateOptions {
    /// `Date` coerces both sides to instants; `String` compares raw text.
    pub value_type: DataType,
    pub inclusive: bool,
}

impl Default for DateOptions {
    fn default() -> Self {
        Self {
            value_type: DataType::Date,
            inclusive: true,
        }
    }
}

impl DateOptions {
    pub fn exclusive() -> Self {
        Self {
            inclusive: false,
            ..Self::default()
        }
    }

    pub fn as_text(mut self) -> Self {
        self.value_type = DataType::String;
        self
    }
}

/// Backend-agnostic query produced by [`QueryBuilder::compile`](super::QueryBuilder::compile).
///
/// `page` is opaque: backends hand it back untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompiledQuery {
    #[serde(rename = "query", default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub take: Option<usize>,
    #[serde(default)]
    pub page: Option<Json>,
}

impl CompiledQuery {
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            ..Self::default()
        }
    }
}
