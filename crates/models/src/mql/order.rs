use serde_json::{Map, Value as Json};
use std::cmp::Ordering;

use super::ast::{SortOrder, SortSpec};

/// Stable in-place sort by a single top-level field.
///
/// Records missing the field go last in both directions and keep their
/// relative order.
pub fn apply_sort(records: &mut [Map<String, Json>], sort: &SortSpec) {
    if records.len() <= 1 {
        return;
    }
    records.sort_by(|a, b| {
        match (a.get(&sort.property), b.get(&sort.property)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(va), Some(vb)) => {
                let ord = compare_values(va, vb);
                match sort.order {
                    SortOrder::Asc => ord,
                    SortOrder::Dsc => ord.reverse(),
                }
            }
        }
    });
}

/// Total order over JSON values: by type rank first, then within the type.
pub fn compare_values(a: &Json, b: &Json) -> Ordering {
    match (a, b) {
        (Json::Number(na), Json::Number(nb)) => {
            let fa = na.as_f64().unwrap_or(f64::NAN);
            let fb = nb.as_f64().unwrap_or(f64::NAN);
            fa.partial_cmp(&fb).unwrap_or(Ordering::Equal)
        }
        (Json::String(sa), Json::String(sb)) => sa.cmp(sb),
        (Json::Bool(ba), Json::Bool(bb)) => ba.cmp(bb),
        (Json::Null, Json::Null) => Ordering::Equal,
        (va, vb) if rank(va) == rank(vb) => va.to_string().cmp(&vb.to_string()),
        (va, vb) => rank(va).cmp(&rank(vb)),
    }
}

fn rank(v: &Json) -> u8 {
    match v {
        Json::Null => 0,
        Json::Bool(_) => 1,
        Json::Number(_) => 2,
        Json::String(_) => 3,
        Json::Array(_) => 4,
        Json::Object(_) => 5,
    }
}
