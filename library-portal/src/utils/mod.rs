pub mod jwt;
pub mod query_string;

pub use query_string::QueryParams;
