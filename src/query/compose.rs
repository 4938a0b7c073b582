//! Translates grid search/filter parameters into a single [`Predicate`].
//!
//! Composition is pure: no I/O, no logging side effects beyond debug traces, and the same
//! inputs always produce the same predicate.

use serde::{Deserialize, Serialize};

use super::types::Predicate;
use crate::vehicle::SEARCH_FIELDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Contains,
    Equals,
    Starts,
    Ends,
    Empty,
}

impl FilterOperator {
    /// Exact, case-sensitive operator name lookup.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "contains" => Some(Self::Contains),
            "equals" => Some(Self::Equals),
            "starts" => Some(Self::Starts),
            "ends" => Some(Self::Ends),
            "empty" => Some(Self::Empty),
            _ => None,
        }
    }

    #[must_use]
    pub const fn needs_value(self) -> bool {
        !matches!(self, Self::Empty)
    }
}

/// One field/operator/value constraint as received from the client.
///
/// The operator is kept verbatim so an unrecognised name can be dropped at composition time
/// instead of failing the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterClause {
    pub field: String,
    pub operator: String,
    pub value: Option<String>,
}

impl FilterClause {
    #[must_use]
    pub fn new(field: &str, operator: &str, value: Option<&str>) -> Self {
        Self {
            field: field.to_string(),
            operator: operator.to_string(),
            value: value.map(str::to_string),
        }
    }

    /// The predicate for this clause, or `None` when it contributes no constraint
    /// (blank field, unknown operator, or missing value).
    #[must_use]
    pub fn to_predicate(&self) -> Option<Predicate> {
        if self.field.is_empty() {
            return None;
        }
        let Some(op) = FilterOperator::parse(&self.operator) else {
            log::debug!("ignoring filter on {} with unknown operator {:?}", self.field, self.operator);
            return None;
        };
        let field = self.field.clone();
        if !op.needs_value() {
            return Some(Predicate::Empty { field });
        }
        let Some(value) = self.value.clone() else {
            log::debug!("ignoring {:?} filter on {} without a value", self.operator, self.field);
            return None;
        };
        Some(match op {
            FilterOperator::Contains => Predicate::Contains { field, value },
            FilterOperator::Equals => Predicate::Equals { field, value },
            FilterOperator::Starts => Predicate::Prefix { field, value },
            FilterOperator::Ends => Predicate::Suffix { field, value },
            FilterOperator::Empty => Predicate::Empty { field },
        })
    }
}

/// Disjunction of case-insensitive substring matches across the searchable fields,
/// or `None` for a blank term.
#[must_use]
pub fn search_predicate(search: Option<&str>) -> Option<Predicate> {
    let term = search.map(str::trim).filter(|t| !t.is_empty())?;
    Some(Predicate::Or(
        SEARCH_FIELDS
            .iter()
            .map(|f| Predicate::Contains { field: (*f).to_string(), value: term.to_string() })
            .collect(),
    ))
}

/// Combines an optional search term with an ordered filter set.
///
/// - neither present: match-all
/// - only one present: that part alone, unwrapped
/// - both: `And([search, filters])`, where several filters are themselves an `And`
#[must_use]
pub fn compose(search: Option<&str>, clauses: &[FilterClause]) -> Predicate {
    let search = search_predicate(search);
    let mut filters: Vec<Predicate> = clauses.iter().filter_map(FilterClause::to_predicate).collect();
    let filters = match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(Predicate::And(filters)),
    };
    match (search, filters) {
        (None, None) => Predicate::True,
        (Some(s), None) => s,
        (None, Some(f)) => f,
        (Some(s), Some(f)) => Predicate::And(vec![s, f]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_means_match_all() {
        assert_eq!(compose(None, &[]), Predicate::True);
        assert_eq!(compose(Some("   "), &[]), Predicate::True);
    }

    #[test]
    fn search_alone_is_a_bare_disjunction() {
        let Predicate::Or(parts) = compose(Some("  tesla "), &[]) else {
            panic!("expected Or");
        };
        assert_eq!(parts.len(), SEARCH_FIELDS.len());
        assert!(parts.iter().all(|p| matches!(p, Predicate::Contains { value, .. } if value == "tesla")));
    }

    #[test]
    fn single_filter_is_not_wrapped() {
        let p = compose(None, &[FilterClause::new("Brand", "equals", Some("BMW"))]);
        assert_eq!(p, Predicate::Equals { field: "Brand".into(), value: "BMW".into() });
    }

    #[test]
    fn several_filters_are_conjoined_in_order() {
        let p = compose(
            None,
            &[
                FilterClause::new("Brand", "starts", Some("B")),
                FilterClause::new("Model", "ends", Some("i4")),
            ],
        );
        assert_eq!(
            p,
            Predicate::And(vec![
                Predicate::Prefix { field: "Brand".into(), value: "B".into() },
                Predicate::Suffix { field: "Model".into(), value: "i4".into() },
            ])
        );
    }

    #[test]
    fn search_and_filter_are_conjoined() {
        let p = compose(Some("i4"), &[FilterClause::new("Brand", "equals", Some("BMW"))]);
        let Predicate::And(parts) = p else { panic!("expected And") };
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[0], Predicate::Or(_)));
        assert_eq!(parts[1], Predicate::Equals { field: "Brand".into(), value: "BMW".into() });
    }

    #[test]
    fn empty_ignores_supplied_value() {
        let p = compose(None, &[FilterClause::new("Segment", "empty", Some("whatever"))]);
        assert_eq!(p, Predicate::Empty { field: "Segment".into() });
    }

    #[test]
    fn unknown_operator_vanishes() {
        let clauses = [
            FilterClause::new("Brand", "regex", Some(".*")),
            FilterClause::new("Brand", "Equals", Some("BMW")),
        ];
        assert_eq!(compose(None, &clauses), Predicate::True);
        let p = compose(Some("x"), &clauses);
        assert!(matches!(p, Predicate::Or(_)));
    }

    #[test]
    fn blank_field_or_missing_value_vanishes() {
        assert_eq!(compose(None, &[FilterClause::new("", "contains", Some("a"))]), Predicate::True);
        assert_eq!(compose(None, &[FilterClause::new("Brand", "contains", None)]), Predicate::True);
    }
}
