mod compose;
mod eval;
mod exec;
mod page;
mod parse;
mod request;
mod types;

pub use compose::{FilterClause, FilterOperator, compose, search_predicate};
pub use eval::{compare_bson, compare_docs, eval_predicate, project_fields};
pub use exec::{count_docs, delete_docs, find_docs};
pub use page::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, PageRequest, PageResult, fetch_page, parse_leading_int,
    positive_or, total_pages,
};
pub use parse::parse_filter_set;
pub use request::{ComposedQuery, OverviewParams, compose_list, compose_overview};
pub use types::{CmpOp, FindOptions, Order, Predicate, SortSpec};
