use serde::Serialize;
use serde_json::{Value, json};

use crate::errors::AppError;
use crate::types::SerializableDateTime;

/// Where a failure happened: the endpoint, the HTTP method, and the request's parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub endpoint: String,
    pub method: String,
    pub request_data: Value,
}

impl RequestContext {
    #[must_use]
    pub fn new(method: &str, endpoint: &str) -> Self {
        Self { endpoint: endpoint.to_string(), method: method.to_string(), request_data: Value::Null }
    }

    #[must_use]
    pub fn with_data(mut self, request_data: Value) -> Self {
        self.request_data = request_data;
        self
    }
}

/// One reported failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    pub message: String,
    pub endpoint: String,
    pub method: String,
    pub timestamp: SerializableDateTime,
    pub request_data: Value,
    pub additional: Value,
}

impl ErrorEntry {
    #[must_use]
    pub fn new(message: impl Into<String>, ctx: &RequestContext) -> Self {
        Self {
            message: message.into(),
            endpoint: ctx.endpoint.clone(),
            method: ctx.method.clone(),
            timestamp: SerializableDateTime::now(),
            request_data: ctx.request_data.clone(),
            additional: Value::Null,
        }
    }

    /// An entry for `err`, tagged with the error's kind.
    #[must_use]
    pub fn from_error(err: &AppError, ctx: &RequestContext) -> Self {
        Self::new(err.to_string(), ctx).with_additional(json!({ "errorKind": err.kind() }))
    }

    /// Merges `extra` into `additional`; object keys in `extra` win.
    #[must_use]
    pub fn with_additional(mut self, extra: Value) -> Self {
        self.additional = match (self.additional, extra) {
            (Value::Object(mut base), Value::Object(more)) => {
                base.extend(more);
                Value::Object(base)
            }
            (Value::Null, v) | (v, Value::Null) => v,
            (_, v) => v,
        };
        self
    }
}
