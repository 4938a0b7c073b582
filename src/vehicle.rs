//! Electric-vehicle record schema.
//!
//! Field names match the column headers of the seed CSV. Numeric columns are coerced to
//! numbers on the way in; everything else is stored as text (the `Date` column included).

use bson::{Bson, Document as BsonDocument};
use serde_json::{Map, Value};

use crate::document::json_to_bson;

pub const BRAND: &str = "Brand";
pub const MODEL: &str = "Model";
pub const ACCEL_SEC: &str = "AccelSec";
pub const TOP_SPEED_KMH: &str = "TopSpeed_KmH";
pub const RANGE_KM: &str = "Range_Km";
pub const EFFICIENCY_WHKM: &str = "Efficiency_WhKm";
pub const FAST_CHARGE_KMH: &str = "FastCharge_KmH";
pub const RAPID_CHARGE: &str = "RapidCharge";
pub const POWER_TRAIN: &str = "PowerTrain";
pub const PLUG_TYPE: &str = "PlugType";
pub const BODY_STYLE: &str = "BodyStyle";
pub const SEGMENT: &str = "Segment";
pub const SEATS: &str = "Seats";
pub const PRICE_EURO: &str = "PriceEuro";
pub const DATE: &str = "Date";

pub const ALL_FIELDS: [&str; 15] = [
    BRAND,
    MODEL,
    ACCEL_SEC,
    TOP_SPEED_KMH,
    RANGE_KM,
    EFFICIENCY_WHKM,
    FAST_CHARGE_KMH,
    RAPID_CHARGE,
    POWER_TRAIN,
    PLUG_TYPE,
    BODY_STYLE,
    SEGMENT,
    SEATS,
    PRICE_EURO,
    DATE,
];

/// Text fields a free-text search term is matched against.
pub const SEARCH_FIELDS: [&str; 6] = [BRAND, MODEL, BODY_STYLE, POWER_TRAIN, PLUG_TYPE, SEGMENT];

/// Fields returned by the overview listing (the identifier is always included).
pub const OVERVIEW_PROJECTION: [&str; 5] = [BRAND, MODEL, BODY_STYLE, PRICE_EURO, DATE];

pub const NUMERIC_FIELDS: [&str; 7] =
    [ACCEL_SEC, TOP_SPEED_KMH, RANGE_KM, EFFICIENCY_WHKM, FAST_CHARGE_KMH, SEATS, PRICE_EURO];

#[must_use]
pub fn is_known_field(name: &str) -> bool {
    ALL_FIELDS.contains(&name)
}

#[must_use]
pub fn is_numeric_field(name: &str) -> bool {
    NUMERIC_FIELDS.contains(&name)
}

/// Parses a numeric cell. Blank or unparseable input yields `None`.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Integral values that fit in 32 bits are stored as `Int32`, the rest as `Double`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn number_to_bson(f: f64) -> Bson {
    if f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) {
        Bson::Int32(f as i32)
    } else {
        Bson::Double(f)
    }
}

/// Coerces a raw text cell according to the schema type of `field`.
#[must_use]
pub fn coerce_text(field: &str, raw: &str) -> Bson {
    if is_numeric_field(field) {
        parse_number(raw).map_or(Bson::Null, number_to_bson)
    } else {
        Bson::String(raw.to_string())
    }
}

/// Coerces a JSON value according to the schema type of `field`.
#[must_use]
pub fn coerce_json(field: &str, v: &Value) -> Bson {
    if !is_numeric_field(field) {
        return json_to_bson(v);
    }
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map_or(Bson::Null, number_to_bson),
        Value::String(s) => coerce_text(field, s),
        _ => Bson::Null,
    }
}

/// Builds a stored record body from a JSON object, coercing schema fields.
/// Keys outside the schema are kept as-is.
#[must_use]
pub fn record_from_json(obj: &Map<String, Value>) -> BsonDocument {
    let mut out = BsonDocument::new();
    for (k, v) in obj {
        out.insert(k.clone(), coerce_json(k, v));
    }
    out
}
