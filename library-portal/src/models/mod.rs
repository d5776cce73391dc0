pub mod auth;
pub mod filters;
pub mod query;
pub mod result;

pub use filters::{ActiveFilter, FilterParam, FilterSet, FilterValue};
pub use query::{ListQuery, Ordering, PaginationStyle};
pub use result::{ListEnvelope, ListResult};
