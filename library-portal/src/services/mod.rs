pub mod api_client;
pub mod controller;
pub mod detail;
pub mod forms;
pub mod gateway;
pub mod url_sync;
