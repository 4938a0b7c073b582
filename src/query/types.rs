use bson::Bson;
use serde::{Deserialize, Serialize};

// Safety limits to prevent resource abuse
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_SORT_FIELDS: usize = 8;
pub(crate) const MAX_PROJECTION_FIELDS: usize = 64;
pub(crate) const MAX_LIMIT: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// `"asc"` sorts ascending; any other value sorts descending.
    #[must_use]
    pub fn from_param(s: Option<&str>) -> Self {
        if s.is_some_and(|s| s.trim() == "asc") { Self::Asc } else { Self::Desc }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

/// Options for `find_docs`.
///
/// Sorting is applied before the skip/limit window; projection is applied last.
/// Without a sort the collection's natural (insertion) order is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOptions {
    pub projection: Option<Vec<String>>,
    pub sort: Option<Vec<SortSpec>>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Backend-neutral selection condition over stored records.
///
/// Text variants match case-insensitively and literally; they only ever match string values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Predicate {
    True,
    Contains { field: String, value: String },
    Equals { field: String, value: String },
    Prefix { field: String, value: String },
    Suffix { field: String, value: String },
    /// Field is absent, null, or the empty string.
    Empty { field: String },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Cmp { field: String, op: CmpOp, value: Bson },
}

impl Predicate {
    #[must_use]
    pub fn is_match_all(&self) -> bool {
        matches!(self, Self::True)
    }
}
