use bson::{Bson, Document as BsonDocument};
use std::borrow::Cow;
use std::cmp::Ordering;

use super::types::{CmpOp, MAX_PATH_DEPTH, MAX_SORT_FIELDS, Order, Predicate, SortSpec};
use crate::document::{Document, ID_KEY};

#[must_use]
pub fn eval_predicate(doc: &Document, p: &Predicate) -> bool {
    match p {
        Predicate::True => true,
        Predicate::And(ps) => ps.iter().all(|p| eval_predicate(doc, p)),
        Predicate::Or(ps) => ps.iter().any(|p| eval_predicate(doc, p)),
        Predicate::Not(p) => !eval_predicate(doc, p),
        Predicate::Contains { field, value } => {
            text_match(doc, field, |s| s.to_lowercase().contains(&value.to_lowercase()))
        }
        Predicate::Prefix { field, value } => {
            text_match(doc, field, |s| s.to_lowercase().starts_with(&value.to_lowercase()))
        }
        Predicate::Suffix { field, value } => {
            text_match(doc, field, |s| s.to_lowercase().ends_with(&value.to_lowercase()))
        }
        Predicate::Equals { field, value } => {
            field_value(doc, field).is_some_and(|v| equals_coerced(&v, value))
        }
        Predicate::Empty { field } => match field_value(doc, field).as_deref() {
            None | Some(Bson::Null | Bson::Undefined) => true,
            Some(Bson::String(s)) => s.is_empty(),
            Some(_) => false,
        },
        Predicate::Cmp { field, op, value } => field_value(doc, field).is_some_and(|v| {
            let ord = compare_bson(&v, value);
            match op {
                CmpOp::Gt => ord == Ordering::Greater,
                CmpOp::Gte => ord != Ordering::Less,
                CmpOp::Lt => ord == Ordering::Less,
                CmpOp::Lte => ord != Ordering::Greater,
            }
        }),
    }
}

fn text_match<F: Fn(&str) -> bool>(doc: &Document, field: &str, f: F) -> bool {
    match field_value(doc, field).as_deref() {
        Some(Bson::String(s)) => f(s),
        _ => false,
    }
}

/// Exact match with the query text coerced to the stored value's type.
fn equals_coerced(v: &Bson, expected: &str) -> bool {
    match v {
        Bson::String(s) => s == expected,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => {
            expected.trim().parse::<f64>().is_ok_and(|e| as_f64(v) == Some(e))
        }
        Bson::Boolean(b) => match expected.trim() {
            "true" => *b,
            "false" => !*b,
            _ => false,
        },
        _ => false,
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(v: &Bson) -> Option<f64> {
    match v {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

/// Resolves a (possibly dotted) field path. `_id` resolves to the record identifier.
fn field_value<'a>(doc: &'a Document, path: &str) -> Option<Cow<'a, Bson>> {
    if path == ID_KEY {
        return Some(Cow::Owned(Bson::String(doc.id.to_string())));
    }
    get_path(&doc.data, path).map(Cow::Borrowed)
}

fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() || path.len() > 1024 {
        return None;
    }
    let mut cur = doc;
    let mut parts = path.split('.').take(MAX_PATH_DEPTH + 1).peekable();
    while let Some(part) = parts.next() {
        let v = cur.get(part)?;
        if parts.peek().is_none() {
            return Some(v);
        }
        match v {
            Bson::Document(d) => cur = d,
            _ => return None,
        }
    }
    None
}

#[must_use]
pub fn compare_docs(a: &Document, b: &Document, sort: &[SortSpec]) -> Ordering {
    for s in sort.iter().take(MAX_SORT_FIELDS) {
        let va = field_value(a, &s.field);
        let vb = field_value(b, &s.field);
        let ord = match (va.as_deref(), vb.as_deref()) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if matches!(s.order, Order::Asc) { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

#[must_use]
pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return x.total_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.timestamp_millis().cmp(&y.timestamp_millis()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::Null | Bson::Undefined => 0,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 1,
        Bson::String(_) | Bson::Symbol(_) => 2,
        Bson::Document(_) => 3,
        Bson::Array(_) => 4,
        Bson::Binary(_) => 5,
        Bson::ObjectId(_) => 6,
        Bson::Boolean(_) => 7,
        Bson::DateTime(_) => 8,
        Bson::Timestamp(_) => 9,
        _ => 10,
    }
}

#[must_use]
pub fn project_fields(doc: &BsonDocument, fields: &[String]) -> BsonDocument {
    let mut out = BsonDocument::new();
    for f in fields {
        if let Some(v) = doc.get(f) {
            out.insert(f.clone(), v.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn tesla() -> Document {
        Document::new(doc! {
            "Brand": "Tesla ", "Model": "Model 3 Long Range", "PriceEuro": 55480,
            "AccelSec": 4.6, "RapidCharge": "Yes", "Segment": "", "PlugType": null,
            "specs": {"battery": {"kwh": 75}}
        })
    }

    fn p_contains(field: &str, value: &str) -> Predicate {
        Predicate::Contains { field: field.into(), value: value.into() }
    }

    #[test]
    fn text_operators_ignore_case() {
        let d = tesla();
        assert!(eval_predicate(&d, &p_contains("Model", "LONG")));
        assert!(eval_predicate(&d, &Predicate::Prefix { field: "Model".into(), value: "model".into() }));
        assert!(eval_predicate(&d, &Predicate::Suffix { field: "Model".into(), value: "range".into() }));
        assert!(!eval_predicate(&d, &Predicate::Prefix { field: "Model".into(), value: "3".into() }));
    }

    #[test]
    fn text_operators_are_literal() {
        let d = Document::new(doc! {"Model": "e-208 (50kWh)"});
        assert!(eval_predicate(&d, &p_contains("Model", "(50")));
        assert!(!eval_predicate(&d, &p_contains("Model", "e.208")));
    }

    #[test]
    fn text_operators_skip_numbers() {
        assert!(!eval_predicate(&tesla(), &p_contains("PriceEuro", "55")));
    }

    #[test]
    fn equals_is_exact_and_coerces_numbers() {
        let d = tesla();
        assert!(eval_predicate(&d, &Predicate::Equals { field: "Brand".into(), value: "Tesla ".into() }));
        assert!(!eval_predicate(&d, &Predicate::Equals { field: "Brand".into(), value: "tesla ".into() }));
        assert!(eval_predicate(&d, &Predicate::Equals { field: "PriceEuro".into(), value: "55480".into() }));
        assert!(eval_predicate(&d, &Predicate::Equals { field: "AccelSec".into(), value: "4.6".into() }));
        assert!(!eval_predicate(&d, &Predicate::Equals { field: "PriceEuro".into(), value: "abc".into() }));
    }

    #[test]
    fn empty_matches_null_blank_and_missing() {
        let d = tesla();
        for field in ["Segment", "PlugType", "NoSuchField"] {
            assert!(eval_predicate(&d, &Predicate::Empty { field: field.into() }), "{field}");
        }
        assert!(!eval_predicate(&d, &Predicate::Empty { field: "Brand".into() }));
        assert!(!eval_predicate(&d, &Predicate::Empty { field: "PriceEuro".into() }));
    }

    #[test]
    fn dotted_paths_and_id_resolve() {
        let d = tesla();
        let nested = Predicate::Equals { field: "specs.battery.kwh".into(), value: "75".into() };
        assert!(eval_predicate(&d, &nested));
        let by_id = Predicate::Equals { field: "_id".into(), value: d.id.to_string() };
        assert!(eval_predicate(&d, &by_id));
    }

    #[test]
    fn empty_conjunction_and_disjunction() {
        let d = tesla();
        assert!(eval_predicate(&d, &Predicate::And(vec![])));
        assert!(!eval_predicate(&d, &Predicate::Or(vec![])));
        assert!(!eval_predicate(&d, &Predicate::Not(Box::new(Predicate::True))));
    }

    #[test]
    fn cmp_orders_datetimes() {
        let d = Document::new(doc! {"timestamp": bson::DateTime::from_millis(2_000)});
        let after = Predicate::Cmp {
            field: "timestamp".into(),
            op: CmpOp::Gte,
            value: Bson::DateTime(bson::DateTime::from_millis(1_000)),
        };
        assert!(eval_predicate(&d, &after));
    }

    #[test]
    fn missing_fields_sort_first_ascending() {
        let a = Document::new(doc! {"PriceEuro": 10});
        let b = Document::new(doc! {});
        let asc = [SortSpec { field: "PriceEuro".into(), order: Order::Asc }];
        assert_eq!(compare_docs(&a, &b, &asc), Ordering::Greater);
        let desc = [SortSpec { field: "PriceEuro".into(), order: Order::Desc }];
        assert_eq!(compare_docs(&a, &b, &desc), Ordering::Less);
    }
}
