//! Filter/sort engine over in-memory record collections.
//!
//! - `record.rs` - `Queryable`: field access by any accepted spelling
//! - `sort.rs` - comparator, stable sort, column-header sort state
//! - `filter.rs` - search, stage filter, `filter_and_sort`

mod filter;
mod record;
mod sort;

pub use filter::{StageFilter, ViewQuery, filter_and_sort, matches_search};
pub use record::{Queryable, field_value};
pub use sort::{
    RecordComparator, SortExecutor, SortKey, SortOrder, SortState, compare, compare_sign,
};
