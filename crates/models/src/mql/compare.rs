// crates/models/src/mql/compare.rs

//! Per-type comparators.
//!
//! Every function here is total: coercion failures and unsupported symbols
//! yield `false`, never an error. `actual` is `None` when the record has no
//! such field.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value as Json;

use super::ast::{PropertyOptions, Symbol};

/// Apply an ordering symbol to two comparable values.
fn apply<T: PartialOrd + ?Sized>(symbol: Symbol, actual: &T, expected: &T) -> bool {
    match symbol {
        Symbol::Eq => actual == expected,
        Symbol::Ne => actual != expected,
        Symbol::Gt => actual > expected,
        Symbol::Gte => actual >= expected,
        Symbol::Lt => actual < expected,
        Symbol::Lte => actual <= expected,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Coercions
// ─────────────────────────────────────────────────────────────────────────────

/// Strings as-is, anything else by its JSON text.
pub fn to_text(v: &Json) -> String {
    match v {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON numbers, or strings holding a finite number.
pub fn to_number(v: &Json) -> Option<f64> {
    let n = match v {
        Json::Number(n) => n.as_f64()?,
        Json::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// RFC 3339 text, naive date-times / dates (taken as UTC), or epoch seconds.
pub fn to_instant(v: &Json) -> Option<DateTime<Utc>> {
    match v {
        Json::String(s) => parse_instant(s.trim()),
        Json::Number(n) => {
            if let Some(secs) = n.as_i64() {
                return DateTime::from_timestamp(secs, 0);
            }
            let f = n.as_f64()?;
            // i64::MAX as f64 rounds up, so compare with a strict bound.
            if !f.is_finite() || f >= i64::MAX as f64 || f < i64::MIN as f64 {
                return None;
            }
            let secs = f.floor();
            let nanos = ((f - secs) * 1e9) as u32;
            DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
        }
        _ => None,
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ─────────────────────────────────────────────────────────────────────────────
// Comparators
// ─────────────────────────────────────────────────────────────────────────────

/// A substring flag decides the relation and only `ne` negates it; without
/// one, exact equality supports `eq` and `ne` and nothing else.
pub fn compare_string(actual: Option<&Json>, expected: &Json, opts: &PropertyOptions) -> bool {
    let symbol = opts.equality_symbol;
    let substring = opts.starts_with || opts.ends_with || opts.includes;
    if !substring && !symbol.is_equality() {
        return false;
    }

    let fold = |s: String| {
        if opts.case_sensitive {
            s
        } else {
            s.to_lowercase()
        }
    };
    let actual = actual.map(|v| fold(to_text(v)));
    let expected = fold(to_text(expected));

    let relation = match actual.as_deref() {
        None => false,
        Some(a) if opts.starts_with => a.starts_with(expected.as_str()),
        Some(a) if opts.ends_with => a.ends_with(expected.as_str()),
        Some(a) if opts.includes => a.contains(expected.as_str()),
        Some(a) => a == expected,
    };

    match symbol {
        Symbol::Ne => !relation,
        _ => relation,
    }
}

pub fn compare_number(actual: Option<&Json>, expected: &Json, symbol: Symbol) -> bool {
    match (actual.and_then(to_number), to_number(expected)) {
        (Some(a), Some(b)) => apply(symbol, &a, &b),
        _ => false,
    }
}

pub fn compare_boolean(actual: Option<&Json>, expected: &Json, symbol: Symbol) -> bool {
    let equal = actual == Some(expected);
    match symbol {
        Symbol::Eq => equal,
        Symbol::Ne => !equal,
        _ => false,
    }
}

/// With `as_text`, both sides are compared as ordered text and no instant
/// coercion happens.
pub fn compare_date(
    actual: Option<&Json>,
    expected: &Json,
    symbol: Symbol,
    as_text: bool,
) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    if as_text {
        return apply(symbol, to_text(actual).as_str(), to_text(expected).as_str());
    }
    match (to_instant(actual), to_instant(expected)) {
        (Some(a), Some(b)) => apply(symbol, &a, &b),
        _ => false,
    }
}

/// Deep equality; ordering symbols never match.
pub fn compare_object(actual: Option<&Json>, expected: &Json, symbol: Symbol) -> bool {
    let equal = actual == Some(expected);
    match symbol {
        Symbol::Eq => equal,
        Symbol::Ne => !equal,
        _ => false,
    }
}
