//! List-view controller: filter state, debounced search, pagination and the
//! last-request-wins rule for results.
//!
//! Every mutation is applied to a single `watch` channel, so observers (the
//! renderer, URL mirroring) see one consistent state per transition. Fetches
//! run as spawned tasks and must be started from inside a tokio runtime.
//!
//! Each issued request gets the next sequence number; a response is applied
//! only if its number is still the latest issued, whatever order responses
//! arrive in.

use crate::config::ListingSettings;
use crate::models::filters::{ActiveFilter, FilterSet};
use crate::models::query::{ListQuery, Ordering};
use crate::models::result::ListResult;
use crate::services::gateway::{cursor_position, ListEndpoint, ListRequest, RemoteListGateway};
use crate::utils::QueryParams;
use serde::Serialize;
use service_core::error::{AppError, ErrorKind};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing fetched yet.
    Idle,
    /// A search keystroke is waiting for the quiet period to pass.
    Debouncing,
    Fetching,
    Settled,
    Failed,
}

/// Why the visible result is empty after a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&AppError> for ListFailure {
    fn from(err: &AppError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListState<F, T> {
    pub query: ListQuery<F>,
    pub phase: Phase,
    pub result: ListResult<T>,
    pub failure: Option<ListFailure>,
    /// Latest request sequence number handed out.
    pub issued_seq: u64,
    /// Sequence number of the request whose response is displayed.
    pub applied_seq: u64,
    pub debounce_pending: bool,
}

impl<F: FilterSet, T> ListState<F, T> {
    fn new(query: ListQuery<F>) -> Self {
        Self {
            query,
            phase: Phase::Idle,
            result: ListResult::empty(),
            failure: None,
            issued_seq: 0,
            applied_seq: 0,
            debounce_pending: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.issued_seq != self.applied_seq
    }

    /// Pagination controls are disabled when there is nothing to page.
    pub fn pagination_enabled(&self) -> bool {
        self.result.total_count > 0
    }

    pub fn has_next(&self) -> bool {
        self.result.next_cursor.is_some()
            || u64::from(self.query.offset) + u64::from(self.query.page_size)
                < self.result.total_count
    }

    pub fn has_previous(&self) -> bool {
        self.result.prev_cursor.is_some() || self.query.offset > 0
    }

    /// A successful fetch that matched nothing, as opposed to an error.
    pub fn is_empty_result(&self) -> bool {
        self.failure.is_none() && self.applied_seq > 0 && self.result.is_empty()
    }

    pub fn requires_login(&self) -> bool {
        matches!(&self.failure, Some(f) if f.kind == ErrorKind::Authentication)
    }

    pub fn active_filters(&self) -> Vec<ActiveFilter<F::Key>> {
        self.query.filters.active()
    }

    /// Phase to show once nothing is pending in the debounce timer.
    fn resting_phase(&self) -> Phase {
        if self.debounce_pending {
            Phase::Debouncing
        } else if self.is_loading() {
            Phase::Fetching
        } else if self.failure.is_some() {
            Phase::Failed
        } else if self.applied_seq == 0 {
            Phase::Idle
        } else {
            Phase::Settled
        }
    }
}

/// A fetch registered in the state but not yet sent.
struct PendingFetch {
    seq: u64,
    request: ListRequest,
    page_size: u32,
}

/// Owns the shared state and knows how to send requests. Cloned into the
/// debounce timer and fetch tasks.
struct Fetcher<F, T> {
    gateway: Arc<dyn RemoteListGateway<T>>,
    state: Arc<watch::Sender<ListState<F, T>>>,
    endpoint: ListEndpoint,
}

impl<F, T> Clone for Fetcher<F, T> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            state: self.state.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

impl<F, T> Fetcher<F, T>
where
    F: FilterSet,
    T: Clone + Send + Sync + 'static,
{
    /// Register a fetch for the current query, or for `cursor` verbatim.
    fn begin(&self, state: &mut ListState<F, T>, cursor: Option<String>) -> PendingFetch {
        state.issued_seq += 1;
        state.phase = Phase::Fetching;
        let request = match cursor {
            Some(url) => ListRequest::Cursor(url),
            None => ListRequest::for_query(&self.endpoint, &state.query),
        };
        PendingFetch {
            seq: state.issued_seq,
            request,
            page_size: state.query.page_size,
        }
    }

    /// Apply `mutate` atomically; if it returns a fetch, send it.
    fn transition<M>(&self, mutate: M)
    where
        M: FnOnce(&Self, &mut ListState<F, T>) -> Option<PendingFetch>,
    {
        let mut pending = None;
        self.state.send_modify(|state| pending = mutate(self, state));
        if let Some(pending) = pending {
            self.dispatch(pending);
        }
    }

    fn dispatch(&self, pending: PendingFetch) {
        let fetcher = self.clone();
        tracing::debug!(
            seq = pending.seq,
            path = %self.endpoint.path,
            request = ?pending.request,
            "Issuing list fetch"
        );
        tokio::spawn(async move {
            let outcome = fetcher
                .gateway
                .fetch(pending.request, pending.page_size)
                .await;
            fetcher.apply(pending.seq, outcome);
        });
    }

    fn apply(&self, seq: u64, outcome: Result<ListResult<T>, AppError>) {
        let path = &self.endpoint.path;
        self.state.send_if_modified(|state| {
            if seq != state.issued_seq {
                tracing::debug!(
                    seq,
                    latest = state.issued_seq,
                    path = %path,
                    "Discarding stale list response"
                );
                return false;
            }

            match outcome {
                Ok(result) => {
                    state.result = result;
                    state.failure = None;
                }
                Err(err) => {
                    if err.kind() == ErrorKind::Authentication {
                        tracing::warn!(path = %path, error = %err, "List fetch rejected, login required");
                    } else {
                        tracing::error!(path = %path, error = %err, "List fetch failed");
                    }
                    state.result = ListResult::empty();
                    state.failure = Some(ListFailure::from(&err));
                }
            }
            state.applied_seq = seq;
            state.phase = state.resting_phase();
            true
        });
    }

    /// Debounce timer expiry for `term`.
    fn settle_search(&self, term: String) {
        self.transition(|fetcher, state| {
            // a newer keystroke owns the timer now
            if state.query.search_term != term {
                return None;
            }
            state.debounce_pending = false;

            let settled = term.trim().to_string();
            if settled == state.query.debounced_search_term {
                state.phase = state.resting_phase();
                return None;
            }

            tracing::debug!(search = %settled, "Search settled");
            state.query.debounced_search_term = settled;
            state.query.reset_to_first_page();
            Some(fetcher.begin(state, None))
        });
    }
}

/// Drives one list page. Create one per page view and drop it on unmount.
pub struct ListQueryController<F, T> {
    fetcher: Fetcher<F, T>,
    listing: ListingSettings,
    debounce: Option<JoinHandle<()>>,
}

impl<F, T> ListQueryController<F, T>
where
    F: FilterSet,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        endpoint: ListEndpoint,
        gateway: Arc<dyn RemoteListGateway<T>>,
        listing: ListingSettings,
    ) -> Self {
        let query = ListQuery::new(listing.default_page_size);
        Self::with_query(endpoint, gateway, listing, query)
    }

    /// Start from a query rehydrated from the address bar.
    pub fn with_query(
        endpoint: ListEndpoint,
        gateway: Arc<dyn RemoteListGateway<T>>,
        listing: ListingSettings,
        query: ListQuery<F>,
    ) -> Self {
        let (state, _) = watch::channel(ListState::new(query));
        Self {
            fetcher: Fetcher {
                gateway,
                state: Arc::new(state),
                endpoint,
            },
            listing,
            debounce: None,
        }
    }

    pub fn endpoint(&self) -> &ListEndpoint {
        &self.fetcher.endpoint
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<F, T>> {
        self.fetcher.state.subscribe()
    }

    pub fn snapshot(&self) -> ListState<F, T> {
        self.fetcher.state.borrow().clone()
    }

    /// Parameters the next fetch would send, scope excluded.
    pub fn build_query_params(&self) -> QueryParams {
        self.fetcher
            .state
            .borrow()
            .query
            .build_query_params(self.fetcher.endpoint.style)
    }

    /// First fetch after mount.
    pub fn load(&mut self) {
        self.refresh();
    }

    /// Re-send the current query unchanged.
    pub fn refresh(&mut self) {
        self.fetcher
            .transition(|fetcher, state| Some(fetcher.begin(state, None)));
    }

    /// Echo `raw` immediately; send it once typing pauses for the configured
    /// quiet period. Each call restarts the timer.
    pub fn set_search_term(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        self.cancel_debounce();

        self.fetcher.state.send_modify(|state| {
            state.query.search_term = raw.clone();
            state.debounce_pending = true;
            state.phase = Phase::Debouncing;
        });

        let fetcher = self.fetcher.clone();
        let quiet = self.listing.search_debounce();
        self.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            fetcher.settle_search(raw);
        }));
    }

    /// Set one filter and go back to the first page.
    pub fn set_filter(&mut self, change: F::Change) {
        self.fetcher.transition(|fetcher, state| {
            state.query.filters.apply(change);
            state.query.reset_to_first_page();
            Some(fetcher.begin(state, None))
        });
    }

    /// Drop one active filter chip.
    pub fn remove_filter(&mut self, key: F::Key) {
        self.fetcher.transition(|fetcher, state| {
            state.query.filters.clear(key);
            state.query.reset_to_first_page();
            Some(fetcher.begin(state, None))
        });
    }

    /// Jump to a 1-based page; filters are untouched.
    pub fn set_page(&mut self, page: u32) {
        self.fetcher.transition(|fetcher, state| {
            state.query.set_page(page);
            Some(fetcher.begin(state, None))
        });
    }

    pub fn set_offset(&mut self, offset: u32) {
        self.fetcher.transition(|fetcher, state| {
            state.query.offset = offset;
            Some(fetcher.begin(state, None))
        });
    }

    /// Change the page size and go back to the first page. Sizes outside the
    /// configured options are ignored.
    pub fn set_page_size(&mut self, page_size: u32) {
        if !self.listing.is_allowed_page_size(page_size) {
            tracing::warn!(
                page_size,
                options = ?self.listing.page_size_options,
                "Ignoring unsupported page size"
            );
            return;
        }

        self.fetcher.transition(|fetcher, state| {
            state.query.page_size = page_size;
            state.query.reset_to_first_page();
            Some(fetcher.begin(state, None))
        });
    }

    pub fn set_ordering(&mut self, ordering: Option<Ordering>) {
        self.fetcher.transition(|fetcher, state| {
            state.query.ordering = ordering;
            state.query.reset_to_first_page();
            Some(fetcher.begin(state, None))
        });
    }

    /// Reset every filter and the search in one transition with one fetch.
    /// Clearing an already-clear query sends nothing.
    pub fn clear_all_filters(&mut self) {
        self.cancel_debounce();

        let style = self.fetcher.endpoint.style;
        self.fetcher.transition(|fetcher, state| {
            if state.query.is_clear() && !state.debounce_pending {
                return None;
            }

            // unsettled keystrokes alone never reached the server
            let before = state.query.build_query_params(style);
            state.query.clear();
            state.debounce_pending = false;

            if state.query.build_query_params(style) != before {
                Some(fetcher.begin(state, None))
            } else {
                state.phase = state.resting_phase();
                None
            }
        });
    }

    /// Follow the server's next/previous link. Returns false when there is
    /// no such link. A page size named by the link is adopted when it is one
    /// of the configured options, so `page()` matches what was fetched.
    pub fn follow_cursor(&mut self, direction: CursorDirection) -> bool {
        let cursor = {
            let state = self.fetcher.state.borrow();
            match direction {
                CursorDirection::Next => state.result.next_cursor.clone(),
                CursorDirection::Previous => state.result.prev_cursor.clone(),
            }
        };
        let Some(cursor) = cursor else {
            return false;
        };

        let style = self.fetcher.endpoint.style;
        let listing = &self.listing;
        self.fetcher.transition(|fetcher, state| {
            if let Some(position) = cursor_position(&cursor, style, state.query.page_size) {
                match position.page_size {
                    Some(size) if size != state.query.page_size => {
                        if listing.is_allowed_page_size(size) {
                            state.query.page_size = size;
                        } else {
                            tracing::warn!(
                                page_size = size,
                                cursor = %cursor,
                                "Cursor page size is not a configured option"
                            );
                        }
                    }
                    _ => {}
                }
                state.query.offset = position.offset;
            }
            Some(fetcher.begin(state, Some(cursor)))
        });
        true
    }

    fn cancel_debounce(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.abort();
        }
    }
}

impl<F, T> Drop for ListQueryController<F, T> {
    fn drop(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.abort();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorDirection {
    Next,
    Previous,
}
