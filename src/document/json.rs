//! Plain JSON <-> BSON value conversion for records crossing the HTTP and import boundaries.
//!
//! Unlike extended JSON, this keeps the wire shape a grid expects: numbers stay numbers and
//! datetimes render as RFC 3339 strings.

use bson::{Bson, Document as BsonDocument};
use chrono::DateTime;
use serde_json::{Map, Number, Value};

#[must_use]
pub fn bson_to_json(v: &Bson) -> Value {
    match v {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::Number(Number::from(*i)),
        Bson::Int64(i) => Value::Number(Number::from(*i)),
        Bson::Double(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(d) => {
            Value::Object(d.iter().map(|(k, v)| (k.clone(), bson_to_json(v))).collect::<Map<_, _>>())
        }
        Bson::DateTime(dt) => DateTime::from_timestamp_millis(dt.timestamp_millis())
            .map_or(Value::Null, |t| Value::String(t.to_rfc3339())),
        other => other.clone().into_relaxed_extjson(),
    }
}

#[must_use]
pub fn json_to_bson(v: &Value) -> Bson {
    match v {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => number_to_bson(n),
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(map) => {
            let mut d = BsonDocument::new();
            for (k, v) in map {
                d.insert(k.clone(), json_to_bson(v));
            }
            Bson::Document(d)
        }
    }
}

fn number_to_bson(n: &Number) -> Bson {
    if let Some(i) = n.as_i64() {
        return i32::try_from(i).map_or(Bson::Int64(i), Bson::Int32);
    }
    n.as_f64().map_or(Bson::Null, Bson::Double)
}
