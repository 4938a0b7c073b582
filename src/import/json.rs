use serde_json::Value;
use std::io::{BufRead, BufReader, Read};

use super::pipeline::BatchWriter;
use crate::errors::AppError;
use crate::vehicle::record_from_json;

/// A single JSON array of record objects. Non-object elements are rejected one by one; a
/// document that is not an array fails outright.
pub(super) fn read_array<R: Read>(reader: R, out: &mut BatchWriter<'_>) -> Result<(), AppError> {
    let root: Value = serde_json::from_reader(BufReader::new(reader))?;
    let Value::Array(items) = root else {
        return Err(AppError::InvalidInput("expected a JSON array of records".into()));
    };
    for (i, item) in items.into_iter().enumerate() {
        let at = i as u64 + 1;
        match item {
            Value::Object(obj) => out.push(record_from_json(&obj))?,
            other => {
                let raw = other.to_string();
                out.reject(at, AppError::InvalidInput("record is not an object".into()), Some(&raw))?;
            }
        }
    }
    Ok(())
}

/// One record object per line; blank lines are ignored.
pub(super) fn read_ndjson<R: Read>(reader: R, out: &mut BatchWriter<'_>) -> Result<(), AppError> {
    let mut line_no = 0u64;
    for line in BufReader::new(reader).lines() {
        let line = line?;
        line_no += 1;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(obj)) => out.push(record_from_json(&obj))?,
            Ok(_) => out.reject(
                line_no,
                AppError::InvalidInput("record is not an object".into()),
                Some(text),
            )?,
            Err(e) => out.reject(line_no, AppError::Json(e), Some(text))?,
        }
    }
    Ok(())
}
