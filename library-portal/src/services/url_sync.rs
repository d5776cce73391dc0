//! Mirrors the settled list query into the address bar.

use crate::models::filters::FilterSet;
use crate::models::query::{ListQuery, PaginationStyle};
use crate::services::controller::ListState;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The navigable location of the current page.
pub trait LocationBar: Send + Sync {
    fn path(&self) -> String;
    /// Current query string without the leading `?`.
    fn query(&self) -> String;
    /// Replace the current history entry. Never adds one.
    fn replace(&self, url: &str);
}

/// In-memory history, used where there is no real address bar.
pub struct MemoryLocation {
    history: Mutex<Vec<String>>,
}

impl MemoryLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![url.into()]),
        }
    }

    pub fn href(&self) -> String {
        self.entries().last().cloned().unwrap_or_default()
    }

    /// Number of back-button entries.
    pub fn history_len(&self) -> usize {
        self.entries().len()
    }

    /// Regular navigation to another page.
    pub fn push(&self, url: impl Into<String>) {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.into());
    }

    fn entries(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl LocationBar for MemoryLocation {
    fn path(&self) -> String {
        let href = self.href();
        href.split_once('?')
            .map_or(href.clone(), |(path, _)| path.to_string())
    }

    fn query(&self) -> String {
        self.href()
            .split_once('?')
            .map(|(_, query)| query.to_string())
            .unwrap_or_default()
    }

    fn replace(&self, url: &str) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        match history.last_mut() {
            Some(current) => *current = url.to_string(),
            None => history.push(url.to_string()),
        }
    }
}

/// Mirrors one page view's query. Bound to the path current at creation; once
/// the user navigates elsewhere it never writes again.
pub struct UrlStateSync<L> {
    location: Arc<L>,
    path: String,
    style: PaginationStyle,
    default_page_size: u32,
}

impl<L: LocationBar> UrlStateSync<L> {
    pub fn new(location: Arc<L>, style: PaginationStyle, default_page_size: u32) -> Self {
        let path = location.path();
        Self {
            location,
            path,
            style,
            default_page_size,
        }
    }

    pub fn location(&self) -> &Arc<L> {
        &self.location
    }

    /// Whether the address bar still shows the page this sync belongs to.
    pub fn is_current(&self) -> bool {
        self.location.path() == self.path
    }

    /// Write `query` into the address bar if it differs from what is there.
    /// Returns whether the location changed.
    pub fn sync<F: FilterSet>(&self, query: &ListQuery<F>) -> bool {
        if !self.is_current() {
            tracing::debug!(
                owner = %self.path,
                current = %self.location.path(),
                "Page no longer current, leaving location alone"
            );
            return false;
        }

        let serialized = query
            .to_url_params(self.style, self.default_page_size)
            .to_query_string();
        if serialized == self.location.query() {
            return false;
        }

        let url = if serialized.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, serialized)
        };
        tracing::debug!(url = %url, "Replacing location");
        self.location.replace(&url);
        true
    }
}

/// Follow controller state and mirror every settled query change. Raw
/// keystrokes serialise identically and therefore never touch history.
///
/// The task ends when the controller's state is gone or the user has left
/// the page, whichever comes first. In-flight fetches may outlive the
/// controller, so the channel alone is not enough.
pub fn spawn_url_sync<F, T, L>(
    mut state: watch::Receiver<ListState<F, T>>,
    sync: UrlStateSync<L>,
) -> JoinHandle<()>
where
    F: FilterSet,
    T: Send + Sync + 'static,
    L: LocationBar + 'static,
{
    tokio::spawn(async move {
        loop {
            if !sync.is_current() {
                tracing::debug!("List page left, URL sync stopped");
                break;
            }
            {
                let current = state.borrow_and_update();
                sync.sync(&current.query);
            }
            if state.changed().await.is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::filters::FilterValue;
    use crate::views::attendance::{AttendanceChange, AttendanceFilters, AttendanceStatus};

    #[test]
    fn test_replace_does_not_grow_history() {
        let location = Arc::new(MemoryLocation::new("/courses/42/attendance"));
        let sync = UrlStateSync::new(location.clone(), PaginationStyle::LimitOffset, 10);

        let mut query = ListQuery::<AttendanceFilters>::new(20);
        query
            .filters
            .apply(AttendanceChange::Status(FilterValue::Only(AttendanceStatus::Present)));
        query.offset = 40;

        assert!(sync.sync(&query));
        assert_eq!(
            location.href(),
            "/courses/42/attendance?status=present&limit=20&offset=40"
        );

        query.offset = 60;
        assert!(sync.sync(&query));
        assert!(!sync.sync(&query));
        assert_eq!(location.history_len(), 1);
    }

    #[test]
    fn test_cleared_query_drops_query_string() {
        let location = Arc::new(MemoryLocation::new("/library?language=ar"));
        let sync = UrlStateSync::new(location.clone(), PaginationStyle::LimitOffset, 10);

        let query = ListQuery::<crate::views::library::LibraryFilters>::new(10);
        assert!(sync.sync(&query));
        assert_eq!(location.href(), "/library");
    }

    #[test]
    fn test_other_page_is_never_written() {
        let location = Arc::new(MemoryLocation::new("/courses/42/attendance"));
        let sync = UrlStateSync::new(location.clone(), PaginationStyle::LimitOffset, 10);
        location.push("/profile");

        let mut query = ListQuery::<AttendanceFilters>::new(10);
        query
            .filters
            .apply(AttendanceChange::Status(FilterValue::Only(AttendanceStatus::Late)));

        assert!(!sync.is_current());
        assert!(!sync.sync(&query));
        assert_eq!(location.href(), "/profile");
    }

    #[test]
    fn test_raw_search_is_not_mirrored() {
        let location = Arc::new(MemoryLocation::new("/courses/42/attendance"));
        let sync = UrlStateSync::new(location.clone(), PaginationStyle::LimitOffset, 10);

        let mut query = ListQuery::<AttendanceFilters>::new(10);
        query.search_term = "ali".to_string();
        assert!(!sync.sync(&query));
        assert_eq!(location.href(), "/courses/42/attendance");
    }
}
