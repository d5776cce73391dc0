pub mod retry;

pub use retry::{RetryConfig, is_retryable, retry_http_call};
