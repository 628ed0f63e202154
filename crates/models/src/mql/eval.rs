// crates/models/src/mql/eval.rs

use serde_json::{Map, Value as Json};

use super::ast::{DataType, PredicateToken, Token};
use super::compare::{compare_boolean, compare_date, compare_number, compare_object, compare_string};
use super::error::QueryError;

/// Check link/operand alternation, recursing into groups.
///
/// A list without links needs no alternation; a list with any link must be
/// `operand (link operand)*`.
pub fn validate(tokens: &[Token]) -> Result<(), QueryError> {
    if tokens.iter().any(Token::is_link) {
        validate_links(tokens)?;
    }
    for token in tokens {
        if let Token::Group(inner) = token {
            validate(inner)?;
        }
    }
    Ok(())
}

/// Decide whether `record` satisfies `tokens`.
///
/// An empty list matches everything. Without links every token must hold;
/// with links the operands are folded left to right with no precedence.
pub fn evaluate(tokens: &[Token], record: &Map<String, Json>) -> Result<bool, QueryError> {
    if tokens.is_empty() {
        return Ok(true);
    }

    if !tokens.iter().any(Token::is_link) {
        for token in tokens {
            if !eval_token(token, record)? {
                return Ok(false);
            }
        }
        return Ok(true);
    }

    validate_links(tokens)?;

    let mut result = eval_token(&tokens[0], record)?;
    for (i, pair) in tokens[1..].chunks_exact(2).enumerate() {
        let Token::Link(link) = &pair[0] else {
            return Err(QueryError::structure(2 * i + 1, "expected AND or OR"));
        };
        let operand = eval_token(&pair[1], record)?;
        result = link.combine(result, operand);
    }
    Ok(result)
}

/// Top-level alternation only; groups are checked when they are evaluated.
fn validate_links(tokens: &[Token]) -> Result<(), QueryError> {
    if tokens.len() % 2 == 0 {
        return Err(QueryError::structure(
            tokens.len(),
            format!("linked query must have an odd number of tokens, got {}", tokens.len()),
        ));
    }
    for (position, token) in tokens.iter().enumerate() {
        let ok = if position % 2 == 1 {
            token.is_link()
        } else {
            matches!(token, Token::Predicate(_) | Token::Group(_))
        };
        if !ok {
            let reason = if position % 2 == 1 {
                "expected AND or OR"
            } else {
                "expected a predicate or group"
            };
            return Err(QueryError::structure(position, reason));
        }
    }
    Ok(())
}

fn eval_token(token: &Token, record: &Map<String, Json>) -> Result<bool, QueryError> {
    match token {
        Token::Predicate(p) => Ok(eval_predicate(p, record)),
        Token::Group(inner) => evaluate(inner, record),
        Token::Link(_) | Token::Unrecognized(_) => Ok(false),
    }
}

fn eval_predicate(p: &PredicateToken, record: &Map<String, Json>) -> bool {
    let actual = record.get(&p.property);
    let opts = &p.options;
    let symbol = opts.equality_symbol;

    match opts.data_type {
        DataType::String if opts.date_bound => compare_date(actual, &p.value, symbol, true),
        DataType::String => compare_string(actual, &p.value, opts),
        DataType::Number => compare_number(actual, &p.value, symbol),
        DataType::Boolean => compare_boolean(actual, &p.value, symbol),
        DataType::Date => compare_date(actual, &p.value, symbol, false),
        DataType::Object => compare_object(actual, &p.value, symbol),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mql::ast::{Link, PropertyOptions, Symbol};
    use crate::mql::query::query_builder;
    use serde_json::json;

    fn record(v: Json) -> Map<String, Json> {
        match v {
            Json::Object(map) => map,
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    fn pred(property: &str, value: Json, options: PropertyOptions) -> Token {
        Token::Predicate(PredicateToken {
            property: property.to_string(),
            value,
            options,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Link-free lists
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn empty_matches_everything() {
        for r in [json!({}), json!({ "a": 1 }), json!({ "x": null })] {
            assert!(evaluate(&[], &record(r)).unwrap());
        }
    }

    #[test]
    fn link_free_is_conjunction() {
        let q = query_builder()
            .property_with("a", 1, PropertyOptions::number())
            .property_with("b", 2, PropertyOptions::number())
            .compile();

        assert!(evaluate(&q.tokens, &record(json!({ "a": 1, "b": 2 }))).unwrap());
        assert!(!evaluate(&q.tokens, &record(json!({ "a": 1, "b": 3 }))).unwrap());
        assert!(!evaluate(&q.tokens, &record(json!({ "a": 0, "b": 2 }))).unwrap());
    }

    #[test]
    fn unrecognized_token_is_false() {
        let tokens = vec![Token::Unrecognized(json!({ "what": "ever" }))];
        assert!(!evaluate(&tokens, &record(json!({ "id": 1 }))).unwrap());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Linked lists
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn fold_is_left_associative() {
        // (a OR b) AND c, not a OR (b AND c)
        let t = |name: &str| pred(name, json!(true), PropertyOptions::boolean());
        let tokens = vec![
            t("a"),
            Token::Link(Link::Or),
            t("b"),
            Token::Link(Link::And),
            t("c"),
        ];
        let r = record(json!({ "a": true, "b": false, "c": false }));
        assert!(!evaluate(&tokens, &r).unwrap());
    }

    #[test]
    fn group_is_one_operand() {
        let q = query_builder()
            .property("name", "Alice")
            .and_()
            .complex(|b| {
                b.property_with("age", 30, PropertyOptions::number().symbol(Symbol::Gt))
                    .or_()
                    .property_with("active", true, PropertyOptions::boolean())
            })
            .compile();

        let hits: Vec<bool> = [
            json!({ "name": "Alice", "age": 25, "active": false }),
            json!({ "name": "Alice", "age": 35, "active": false }),
            json!({ "name": "Bob", "age": 20, "active": true }),
        ]
        .into_iter()
        .map(|r| evaluate(&q.tokens, &record(r)).unwrap())
        .collect();

        assert_eq!(hits, vec![false, true, false]);
    }

    #[test]
    fn trailing_link_is_structural_error() {
        let a = pred("a", json!(1), PropertyOptions::number());
        let tokens = vec![a.clone(), Token::Link(Link::And), a, Token::Link(Link::And)];

        let err = evaluate(&tokens, &record(json!({ "a": 1 }))).unwrap_err();
        assert!(matches!(err, QueryError::InvalidStructure { position: 4, .. }));
        assert!(validate(&tokens).is_err());
    }

    #[test]
    fn operand_where_link_expected_is_structural_error() {
        let a = pred("a", json!(1), PropertyOptions::number());
        let tokens = vec![a.clone(), a.clone(), a.clone(), Token::Link(Link::Or), a];

        let err = evaluate(&tokens, &record(json!({ "a": 1 }))).unwrap_err();
        assert!(matches!(err, QueryError::InvalidStructure { position: 1, .. }));
    }

    #[test]
    fn link_where_operand_expected_is_structural_error() {
        let a = pred("a", json!(1), PropertyOptions::number());
        let tokens = vec![Token::Link(Link::And), a.clone(), a];

        let err = validate(&tokens).unwrap_err();
        assert!(matches!(err, QueryError::InvalidStructure { position: 0, .. }));
    }

    #[test]
    fn unrecognized_operand_in_linked_list_is_structural_error() {
        let a = pred("a", json!(1), PropertyOptions::number());
        let tokens = vec![a, Token::Link(Link::And), Token::Unrecognized(json!(7))];
        assert!(evaluate(&tokens, &record(json!({ "a": 1 }))).is_err());
    }

    #[test]
    fn validate_descends_into_groups() {
        let a = pred("a", json!(1), PropertyOptions::number());
        let bad_group = Token::Group(vec![a.clone(), Token::Link(Link::Or)]);
        let tokens = vec![a, Token::Link(Link::And), bad_group];

        assert!(validate(&tokens).is_err());
        assert!(evaluate(&tokens, &record(json!({ "a": 1 }))).is_err());
    }

    #[test]
    fn evaluate_does_not_mutate_tokens() {
        let q = query_builder().property("a", 1).or_().property("b", 2).compile();
        let before = q.tokens.clone();
        let _ = evaluate(&q.tokens, &record(json!({ "a": 1 })));
        assert_eq!(q.tokens, before);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn date_bound_text_predicate_orders_text() {
        use crate::mql::ast::DateOptions;
        let q = query_builder()
            .dates_after_with("createdAt", "2024-01-01", DateOptions::default().as_text())
            .compile();
        assert!(evaluate(&q.tokens, &record(json!({ "createdAt": "2024-01-02" }))).unwrap());
        assert!(!evaluate(&q.tokens, &record(json!({ "createdAt": "2023-12-31" }))).unwrap());
    }

    #[test]
    fn plain_string_predicate_rejects_ordering() {
        let tokens = vec![pred(
            "createdAt",
            json!("2024-01-01"),
            PropertyOptions::string().symbol(Symbol::Gte),
        )];
        assert!(!evaluate(&tokens, &record(json!({ "createdAt": "2024-01-02" }))).unwrap());
    }
}
