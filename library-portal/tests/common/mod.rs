//! Shared helpers for library-portal integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use library_portal::config::{ApiSettings, ListingSettings};
use library_portal::models::result::ListResult;
use library_portal::services::api_client::ApiClient;
use library_portal::services::controller::ListQueryController;
use library_portal::services::gateway::{ListRequest, RemoteListGateway};
use library_portal::views::attendance::{self, AttendanceFilters};
use service_core::error::AppError;
use service_core::http::RetryConfig;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub type Response = Result<ListResult<String>, AppError>;

/// Scripted gateway. In auto mode it answers at once with a page describing
/// the request; in manual mode every request waits for `resolve`.
pub struct MockGateway {
    manual: bool,
    requests: Mutex<Vec<ListRequest>>,
    pending: Mutex<Vec<Option<oneshot::Sender<Response>>>>,
    fail_with: Mutex<Option<u16>>,
}

impl MockGateway {
    pub fn auto() -> Arc<Self> {
        Arc::new(Self::build(false))
    }

    pub fn manual() -> Arc<Self> {
        Arc::new(Self::build(true))
    }

    fn build(manual: bool) -> Self {
        Self {
            manual,
            requests: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
            fail_with: Mutex::new(None),
        }
    }

    pub fn requests(&self) -> Vec<ListRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Query string of the most recent parameterised request.
    pub fn last_query(&self) -> String {
        self.requests()
            .last()
            .and_then(|r| r.params().map(|p| p.to_query_string()))
            .unwrap_or_default()
    }

    /// Make the following auto-mode requests fail with `status`.
    pub fn fail_with_status(&self, status: u16) {
        *self.fail_with.lock().unwrap() = Some(status);
    }

    pub fn succeed(&self) {
        *self.fail_with.lock().unwrap() = None;
    }

    /// Answer the `index`-th request (0-based, in issue order).
    pub fn resolve(&self, index: usize, response: Response) {
        let sender = self.pending.lock().unwrap()[index]
            .take()
            .expect("request already resolved");
        sender.send(response).ok();
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

pub fn page_of(items: &[&str], total_count: u64) -> ListResult<String> {
    ListResult {
        items: items.iter().map(|s| s.to_string()).collect(),
        total_count,
        total_pages: total_count.div_ceil(10).max(1) as u32,
        next_cursor: None,
        prev_cursor: None,
    }
}

fn describe(request: &ListRequest) -> String {
    match request {
        ListRequest::Params { params, .. } => params.to_query_string(),
        ListRequest::Cursor(url) => url.clone(),
    }
}

#[async_trait]
impl RemoteListGateway<String> for MockGateway {
    async fn fetch(&self, request: ListRequest, _page_size: u32) -> Response {
        self.requests.lock().unwrap().push(request.clone());

        if !self.manual {
            if let Some(status) = *self.fail_with.lock().unwrap() {
                return Err(AppError::from_status(status, "scripted failure"));
            }
            return Ok(page_of(&[describe(&request).as_str()], 100));
        }

        let receiver = {
            let (sender, receiver) = oneshot::channel();
            self.pending.lock().unwrap().push(Some(sender));
            receiver
        };
        receiver.await.unwrap_or_else(|_| {
            Err(AppError::Api {
                status: 499,
                message: "dropped".to_string(),
            })
        })
    }
}

pub fn attendance_controller(
    gateway: Arc<MockGateway>,
) -> ListQueryController<AttendanceFilters, String> {
    ListQueryController::new(attendance::endpoint(42), gateway, ListingSettings::default())
}

/// Yield until `gateway` has seen `count` requests.
pub async fn wait_for_requests(gateway: &MockGateway, count: usize) {
    for _ in 0..1_000 {
        if gateway.request_count() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!(
        "expected {} requests, saw {}",
        count,
        gateway.request_count()
    );
}

pub fn api_settings(base_url: String) -> ApiSettings {
    ApiSettings {
        base_url,
        timeout_secs: 5,
        retry: RetryConfig::no_retry(),
    }
}

pub fn api_client(base_url: String) -> ApiClient {
    ApiClient::new(&api_settings(base_url)).expect("Failed to build API client")
}
