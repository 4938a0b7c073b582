use crate::errors::AppError;
use serde::Deserialize;
use serde_json::Value;

use super::compose::FilterClause;

// Serde-facing shape of one element of the `filtersJson` array.
#[derive(Debug, Clone, Deserialize)]
struct FilterClauseSerde {
    #[serde(default, alias = "field")]
    filter: Option<String>,
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    value: Option<Value>,
}

impl TryFrom<FilterClauseSerde> for FilterClause {
    type Error = AppError;

    fn try_from(fs: FilterClauseSerde) -> Result<Self, Self::Error> {
        let value = match fs.value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => Some(v.to_string()),
            Some(other) => {
                return Err(AppError::FilterSet(format!("unsupported filter value: {other}")));
            }
        };
        Ok(Self {
            field: fs.filter.unwrap_or_default(),
            operator: fs.operator.unwrap_or_default(),
            value,
        })
    }
}

/// Parses the structured filter-set encoding: a JSON array of
/// `{filter, operator, value}` objects.
///
/// # Errors
/// Returns [`AppError::FilterSet`] when the text is not valid JSON, is not an array, or an
/// element is not a clause object.
pub fn parse_filter_set(json: &str) -> Result<Vec<FilterClause>, AppError> {
    let raw: Value = serde_json::from_str(json).map_err(|e| AppError::FilterSet(e.to_string()))?;
    let Value::Array(items) = raw else {
        return Err(AppError::FilterSet("expected a JSON array of filters".into()));
    };
    items
        .into_iter()
        .map(|item| {
            let fs: FilterClauseSerde =
                serde_json::from_value(item).map_err(|e| AppError::FilterSet(e.to_string()))?;
            FilterClause::try_from(fs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clause_array() {
        let clauses = parse_filter_set(
            r#"[{"filter":"Brand","operator":"equals","value":"BMW"},{"field":"Seats","operator":"equals","value":5},{"filter":"Segment","operator":"empty"}]"#,
        )
        .unwrap();
        assert_eq!(
            clauses,
            vec![
                FilterClause::new("Brand", "equals", Some("BMW")),
                FilterClause::new("Seats", "equals", Some("5")),
                FilterClause::new("Segment", "empty", None),
            ]
        );
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(parse_filter_set("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_invalid_json_and_non_arrays() {
        assert!(matches!(parse_filter_set("{not valid"), Err(AppError::FilterSet(_))));
        assert!(matches!(
            parse_filter_set(r#"{"filter":"Brand"}"#),
            Err(AppError::FilterSet(_))
        ));
        assert!(matches!(parse_filter_set(r#"["Brand"]"#), Err(AppError::FilterSet(_))));
        assert!(matches!(
            parse_filter_set(r#"[{"filter":"Brand","operator":"equals","value":{"x":1}}]"#),
            Err(AppError::FilterSet(_))
        ));
    }
}
