//! The boundary between a list controller and the remote list endpoint.

use crate::models::filters::FilterSet;
use crate::models::query::{ListQuery, PaginationStyle};
use crate::models::result::{ListEnvelope, ListResult};
use crate::services::api_client::ApiClient;
use crate::utils::QueryParams;
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use std::marker::PhantomData;
use std::sync::Arc;

/// Where a list lives and how it is paged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEndpoint {
    pub path: String,
    pub style: PaginationStyle,
    /// Fixed entity-scoping parameters (`course=42`), sent with every request.
    pub scope: QueryParams,
}

impl ListEndpoint {
    pub fn new(path: impl Into<String>, style: PaginationStyle) -> Self {
        Self {
            path: path.into(),
            style,
            scope: QueryParams::new(),
        }
    }

    pub fn scoped(mut self, key: &str, value: impl ToString) -> Self {
        self.scope.push(key, value.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRequest {
    Params { path: String, params: QueryParams },
    /// A next/previous URL from the server, fetched verbatim.
    Cursor(String),
}

impl ListRequest {
    pub fn for_query<F: FilterSet>(endpoint: &ListEndpoint, query: &ListQuery<F>) -> Self {
        let mut params = endpoint.scope.clone();
        params.extend(query.build_query_params(endpoint.style));
        ListRequest::Params {
            path: endpoint.path.clone(),
            params,
        }
    }

    pub fn params(&self) -> Option<&QueryParams> {
        match self {
            ListRequest::Params { params, .. } => Some(params),
            ListRequest::Cursor(_) => None,
        }
    }
}

#[async_trait]
pub trait RemoteListGateway<T>: Send + Sync {
    /// Fetch one page. `page_size` is only used to derive `total_pages`
    /// when the server does not report it.
    async fn fetch(&self, request: ListRequest, page_size: u32) -> Result<ListResult<T>, AppError>;
}

/// Gateway over the REST API. Accepts both bare-array and paginated
/// envelope responses.
pub struct HttpListGateway<T> {
    api: Arc<ApiClient>,
    _record: PhantomData<fn() -> T>,
}

impl<T> HttpListGateway<T> {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T> RemoteListGateway<T> for HttpListGateway<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch(&self, request: ListRequest, page_size: u32) -> Result<ListResult<T>, AppError> {
        let envelope: ListEnvelope<T> = match &request {
            ListRequest::Params { path, params } => self.api.get_json(path, params).await?,
            ListRequest::Cursor(url) => self.api.get_absolute(url).await?,
        };

        let result = envelope.normalize(page_size);
        tracing::debug!(
            items = result.items.len(),
            total_count = result.total_count,
            has_next = result.next_cursor.is_some(),
            "Normalized list response"
        );
        Ok(result)
    }
}

/// Where a server cursor points: the offset and, when the link names one,
/// its page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub offset: u32,
    pub page_size: Option<u32>,
}

/// Read the position a server cursor points at, so the query can follow it.
/// `page_size` is used when the link does not carry its own.
pub fn cursor_position(
    cursor: &str,
    style: PaginationStyle,
    page_size: u32,
) -> Option<CursorPosition> {
    let url = Url::parse(cursor).ok()?;
    let params: QueryParams = url.query_pairs().into_owned().collect();

    let size_key = match style {
        PaginationStyle::LimitOffset => "limit",
        PaginationStyle::PageNumber => "page_size",
    };
    let link_size = params
        .get(size_key)
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|size| *size > 0);
    let size = link_size.unwrap_or(page_size).max(1);

    let offset = match style {
        PaginationStyle::LimitOffset => params
            .get("offset")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        PaginationStyle::PageNumber => {
            let page = params
                .get("page")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(1)
                .max(1);
            (page - 1).saturating_mul(size)
        }
    };

    Some(CursorPosition {
        offset,
        page_size: link_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::attendance::AttendanceFilters;

    #[test]
    fn test_request_carries_scope_first() {
        let endpoint = ListEndpoint::new("/attendance/", PaginationStyle::LimitOffset)
            .scoped("course", 42);
        let query = ListQuery::<AttendanceFilters>::new(10);
        let request = ListRequest::for_query(&endpoint, &query);
        assert_eq!(
            request.params().unwrap().to_query_string(),
            "course=42&limit=10&offset=0"
        );
    }

    #[test]
    fn test_cursor_position() {
        assert_eq!(
            cursor_position(
                "http://api.local/attendance/?limit=10&offset=30",
                PaginationStyle::LimitOffset,
                10
            ),
            Some(CursorPosition {
                offset: 30,
                page_size: Some(10)
            })
        );
        // DRF omits `page` on the link back to page one
        assert_eq!(
            cursor_position(
                "http://api.local/users/?page_size=20",
                PaginationStyle::PageNumber,
                20
            ),
            Some(CursorPosition {
                offset: 0,
                page_size: Some(20)
            })
        );
        assert_eq!(
            cursor_position("http://api.local/users/?page=3", PaginationStyle::PageNumber, 20),
            Some(CursorPosition {
                offset: 40,
                page_size: None
            })
        );
        assert_eq!(cursor_position("not a url", PaginationStyle::PageNumber, 20), None);
    }

    #[test]
    fn test_cursor_position_uses_the_link_page_size() {
        let position = cursor_position(
            "http://api.local/users/?page=3&page_size=50",
            PaginationStyle::PageNumber,
            10,
        )
        .unwrap();
        assert_eq!(position.offset, 100);
        assert_eq!(position.page_size, Some(50));
    }
}
