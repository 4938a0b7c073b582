use serde::{Deserialize, Serialize};

use super::compose::{FilterClause, compose};
use super::page::PageRequest;
use super::parse::parse_filter_set;
use super::types::Predicate;
use crate::errors::AppError;

/// Raw grid query parameters exactly as received; every field is optional text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverviewParams {
    pub search: Option<String>,
    pub filter: Option<String>,
    pub operator: Option<String>,
    pub value: Option<String>,
    pub filters_json: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
}

impl OverviewParams {
    /// The single `filter`/`operator`/`value` triple, when a field and operator are given.
    #[must_use]
    pub fn legacy_clause(&self) -> Option<FilterClause> {
        let field = self.filter.as_deref().filter(|s| !s.is_empty())?;
        let operator = self.operator.as_deref().filter(|s| !s.is_empty())?;
        Some(FilterClause::new(field, operator, self.value.as_deref()))
    }

    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_params(
            self.page.as_deref(),
            self.page_size.as_deref(),
            self.sort_field.as_deref(),
            self.sort_order.as_deref(),
        )
    }
}

/// The outcome of composing one grid request. Composition never fails: a malformed filter
/// set is kept in `filter_set_error` so the caller can report it.
#[derive(Debug)]
pub struct ComposedQuery {
    pub predicate: Predicate,
    pub page: PageRequest,
    pub filter_set_error: Option<AppError>,
}

/// Resolves the filter set (structured first, else the legacy triple) and composes it with
/// the search term.
#[must_use]
pub fn compose_overview(params: &OverviewParams) -> ComposedQuery {
    let (clauses, filter_set_error) = resolve_clauses(params);
    ComposedQuery {
        predicate: compose(params.search.as_deref(), &clauses),
        page: params.page_request(),
        filter_set_error,
    }
}

/// Predicate for the legacy list endpoint: search plus the single filter triple.
#[must_use]
pub fn compose_list(params: &OverviewParams) -> Predicate {
    let clauses: Vec<FilterClause> = params.legacy_clause().into_iter().collect();
    compose(params.search.as_deref(), &clauses)
}

fn resolve_clauses(params: &OverviewParams) -> (Vec<FilterClause>, Option<AppError>) {
    let legacy = || params.legacy_clause().into_iter().collect::<Vec<_>>();
    match params.filters_json.as_deref().filter(|s| !s.trim().is_empty()) {
        None => (legacy(), None),
        Some(raw) => match parse_filter_set(raw) {
            Ok(clauses) => (clauses, None),
            Err(e) => {
                log::warn!("malformed filtersJson, falling back to legacy filter: {e}");
                (legacy(), Some(e))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> OverviewParams {
        let map: serde_json::Map<String, serde_json::Value> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), serde_json::Value::from(*v))).collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    #[test]
    fn params_use_camel_case_names() {
        let p = params(&[("filtersJson", "[]"), ("pageSize", "5"), ("sortField", "Brand")]);
        assert_eq!(p.filters_json.as_deref(), Some("[]"));
        assert_eq!(p.page_request().page_size, 5);
    }

    #[test]
    fn legacy_triple_is_a_single_clause_filter_set() {
        let q = compose_overview(&params(&[
            ("filter", "Brand"),
            ("operator", "equals"),
            ("value", "BMW"),
        ]));
        assert_eq!(q.predicate, Predicate::Equals { field: "Brand".into(), value: "BMW".into() });
        assert!(q.filter_set_error.is_none());
    }

    #[test]
    fn parsed_filter_set_overrides_legacy_triple() {
        let q = compose_overview(&params(&[
            ("filtersJson", r#"[{"filter":"Model","operator":"contains","value":"i4"}]"#),
            ("filter", "Brand"),
            ("operator", "equals"),
            ("value", "BMW"),
        ]));
        assert_eq!(q.predicate, Predicate::Contains { field: "Model".into(), value: "i4".into() });
    }

    #[test]
    fn malformed_filter_set_falls_back_to_legacy_then_match_all() {
        let q = compose_overview(&params(&[
            ("filtersJson", "{not valid"),
            ("filter", "Brand"),
            ("operator", "equals"),
            ("value", "BMW"),
        ]));
        assert_eq!(q.predicate, Predicate::Equals { field: "Brand".into(), value: "BMW".into() });
        assert!(matches!(q.filter_set_error, Some(AppError::FilterSet(_))));

        let q = compose_overview(&params(&[("filtersJson", "{not valid")]));
        assert_eq!(q.predicate, Predicate::True);
        assert!(q.filter_set_error.is_some());
    }

    #[test]
    fn blank_filters_json_is_absent() {
        let q = compose_overview(&params(&[("filtersJson", "  ")]));
        assert_eq!(q.predicate, Predicate::True);
        assert!(q.filter_set_error.is_none());
    }

    #[test]
    fn list_ignores_filters_json() {
        let p = params(&[("filtersJson", "{bad"), ("search", "zoe")]);
        assert!(matches!(compose_list(&p), Predicate::Or(_)));
    }
}
