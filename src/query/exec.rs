use crate::collection::Collection;
use crate::document::Document;
use crate::errors::AppError;
use std::time::Instant;

use super::eval::{compare_docs, eval_predicate, project_fields};
use super::types::{FindOptions, MAX_LIMIT, MAX_PROJECTION_FIELDS, MAX_SORT_FIELDS, Predicate};

/// Matching documents, sorted, windowed by skip/limit, then projected.
///
/// Without a sort the result keeps natural (insertion) order. `limit` is capped at `MAX_LIMIT`.
#[must_use]
pub fn find_docs(col: &Collection, pred: &Predicate, opts: &FindOptions) -> Vec<Document> {
    let start = Instant::now();
    let skip = opts.skip.unwrap_or(0);
    let limit = opts.limit.unwrap_or(MAX_LIMIT).min(MAX_LIMIT);

    let mut docs: Vec<Document> = match &opts.sort {
        Some(sort) if !sort.is_empty() => {
            if sort.len() > MAX_SORT_FIELDS {
                log::warn!("sort too long: {} (using first {MAX_SORT_FIELDS})", sort.len());
            }
            let mut all = Vec::new();
            col.scan(|d| {
                if eval_predicate(d, pred) {
                    all.push(d.clone());
                }
            });
            // stable: ties keep natural order
            all.sort_by(|a, b| compare_docs(a, b, sort));
            all.into_iter().skip(skip).take(limit).collect()
        }
        _ => {
            let mut out = Vec::new();
            let mut seen = 0usize;
            col.scan(|d| {
                if out.len() < limit && eval_predicate(d, pred) {
                    if seen >= skip {
                        out.push(d.clone());
                    }
                    seen += 1;
                }
            });
            out
        }
    };

    if let Some(fields) = &opts.projection {
        let fields: Vec<String> = fields.iter().take(MAX_PROJECTION_FIELDS).cloned().collect();
        for d in &mut docs {
            d.data = project_fields(&d.data, &fields);
        }
    }

    crate::devtrace!(
        "{{\"op\":\"find\",\"collection\":\"{}\",\"duration_ms\":{},\"result_count\":{},\"skip\":{},\"limit\":{}}}",
        col.name(),
        start.elapsed().as_millis(),
        docs.len(),
        skip,
        limit
    );
    docs
}

#[must_use]
pub fn count_docs(col: &Collection, pred: &Predicate) -> u64 {
    let start = Instant::now();
    let n = if pred.is_match_all() {
        col.len() as u64
    } else {
        let mut n = 0u64;
        col.scan(|d| {
            if eval_predicate(d, pred) {
                n += 1;
            }
        });
        n
    };
    crate::devtrace!(
        "{{\"op\":\"count\",\"collection\":\"{}\",\"duration_ms\":{},\"result_count\":{}}}",
        col.name(),
        start.elapsed().as_millis(),
        n
    );
    n
}

/// Removes every document matching `pred`.
///
/// # Errors
/// Fails when the collection's log cannot be appended; nothing is removed in that case.
pub fn delete_docs(col: &Collection, pred: &Predicate) -> Result<u64, AppError> {
    let n = col.delete_where(|d| eval_predicate(d, pred))?;
    crate::devtrace!("{{\"op\":\"delete\",\"collection\":\"{}\",\"deleted\":{}}}", col.name(), n);
    Ok(n)
}
