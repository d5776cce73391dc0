//! library-portal: list, identity and form plumbing behind the portal pages.
pub mod config;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;
pub mod views;

pub use models::auth::{AuthContext, AuthError};
pub use models::query::{ListQuery, Ordering, PaginationStyle};
pub use models::result::ListResult;
pub use services::controller::{ListQueryController, ListState, Phase};
pub use services::gateway::{HttpListGateway, ListRequest, RemoteListGateway};
pub use services::url_sync::{LocationBar, MemoryLocation, UrlStateSync};
pub use startup::{init_telemetry, Portal};
