use crate::config::ListingSettings;
use crate::models::filters::FilterSet;
use crate::utils::QueryParams;
use serde::Serialize;
use std::fmt;

/// How an endpoint expects to be paged. The query itself always stores an
/// offset; the style only matters at serialisation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationStyle {
    /// `page` (1-based) and `page_size`.
    PageNumber,
    /// `limit` and `offset`.
    LimitOffset,
}

/// Sort field, serialised as `field` or `-field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ordering {
    pub field: String,
    pub descending: bool,
}

impl Ordering {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (descending, field) = match raw.strip_prefix('-') {
            Some(field) => (true, field),
            None => (false, raw),
        };
        let valid = !field.is_empty()
            && field
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        valid.then(|| Self {
            field: field.to_string(),
            descending,
        })
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            f.write_str(&self.field)
        }
    }
}

/// The filter, search, sort and page state one list view holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery<F> {
    /// What the user has typed so far.
    pub search_term: String,
    /// The settled search, the only one ever sent.
    pub debounced_search_term: String,
    pub filters: F,
    pub ordering: Option<Ordering>,
    pub offset: u32,
    pub page_size: u32,
}

impl<F: FilterSet> ListQuery<F> {
    pub fn new(page_size: u32) -> Self {
        Self {
            search_term: String::new(),
            debounced_search_term: String::new(),
            filters: F::default(),
            ordering: None,
            offset: 0,
            page_size: page_size.max(1),
        }
    }

    /// 1-based page number derived from the offset.
    pub fn page(&self) -> u32 {
        self.offset / self.page_size + 1
    }

    pub fn reset_to_first_page(&mut self) {
        self.offset = 0;
    }

    pub fn set_page(&mut self, page: u32) {
        self.offset = page.max(1).saturating_sub(1).saturating_mul(self.page_size);
    }

    /// Whether filters, search and page are all at their defaults.
    /// Ordering is a view preference and not part of the filter state.
    pub fn is_clear(&self) -> bool {
        self.filters.is_default()
            && self.search_term.is_empty()
            && self.debounced_search_term.is_empty()
            && self.offset == 0
    }

    pub fn clear(&mut self) {
        self.filters = F::default();
        self.search_term.clear();
        self.debounced_search_term.clear();
        self.offset = 0;
    }

    /// Outgoing parameters for the list endpoint: non-default filters, the
    /// debounced search, ordering, then pagination in the endpoint's style.
    pub fn build_query_params(&self, style: PaginationStyle) -> QueryParams {
        let mut params = self.filter_params();
        self.write_pagination(style, &mut params);
        params
    }

    /// Parameters mirrored into the address bar. Unlike the API parameters,
    /// the first page and the default page size are left out.
    pub fn to_url_params(&self, style: PaginationStyle, default_page_size: u32) -> QueryParams {
        let mut params = self.filter_params();
        if self.offset == 0 && self.page_size == default_page_size {
            return params;
        }

        // the page size always accompanies a non-first page
        match style {
            PaginationStyle::PageNumber => {
                if self.offset != 0 {
                    params.push("page", self.page().to_string());
                }
                params.push("page_size", self.page_size.to_string());
            }
            PaginationStyle::LimitOffset => {
                params.push("limit", self.page_size.to_string());
                if self.offset != 0 {
                    params.push("offset", self.offset.to_string());
                }
            }
        }
        params
    }

    /// Rebuild a query from the address bar on first mount.
    ///
    /// Anything malformed falls back to its default; an offset that is not a
    /// multiple of the page size is aligned down to the page containing it.
    pub fn from_query_string(query: &str, style: PaginationStyle, listing: &ListingSettings) -> Self {
        let params = QueryParams::parse(query);

        let page_size_key = match style {
            PaginationStyle::PageNumber => "page_size",
            PaginationStyle::LimitOffset => "limit",
        };
        let page_size = params
            .get(page_size_key)
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|size| listing.is_allowed_page_size(*size))
            .unwrap_or(listing.default_page_size);

        let mut query = Self::new(page_size);
        query.filters = F::from_params(&params);

        let search = params
            .get(F::SEARCH_PARAM)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        query.search_term = search.clone();
        query.debounced_search_term = search;

        query.ordering = params.get("ordering").and_then(Ordering::parse);

        match style {
            PaginationStyle::PageNumber => {
                let page = params
                    .get("page")
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(1);
                query.set_page(page);
            }
            PaginationStyle::LimitOffset => {
                let offset = params
                    .get("offset")
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(0);
                query.offset = offset - offset % query.page_size;
            }
        }

        query
    }

    fn filter_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        self.filters.write_params(&mut params);
        params.push_opt(F::SEARCH_PARAM, Some(self.debounced_search_term.clone()));
        if let Some(ordering) = &self.ordering {
            params.push("ordering", ordering.to_string());
        }
        params
    }

    fn write_pagination(&self, style: PaginationStyle, params: &mut QueryParams) {
        match style {
            PaginationStyle::PageNumber => {
                params.push("page", self.page().to_string());
                params.push("page_size", self.page_size.to_string());
            }
            PaginationStyle::LimitOffset => {
                params.push("limit", self.page_size.to_string());
                params.push("offset", self.offset.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::filters::FilterValue;
    use crate::views::attendance::{AttendanceChange, AttendanceFilters, AttendanceStatus};

    #[test]
    fn test_ordering_round_trip() {
        let ordering = Ordering::parse("-created_at").unwrap();
        assert_eq!(ordering, Ordering::desc("created_at"));
        assert_eq!(ordering.to_string(), "-created_at");
        assert_eq!(Ordering::parse("title").unwrap().to_string(), "title");
        assert!(Ordering::parse("-").is_none());
        assert!(Ordering::parse("title; drop").is_none());
    }

    #[test]
    fn test_page_number_is_derived_from_offset() {
        let mut query = ListQuery::<AttendanceFilters>::new(10);
        query.set_page(4);
        assert_eq!(query.offset, 30);
        assert_eq!(query.page(), 4);
        query.set_page(0);
        assert_eq!(query.offset, 0);
    }

    #[test]
    fn test_build_query_params_both_styles() {
        let mut query = ListQuery::<AttendanceFilters>::new(20);
        query
            .filters
            .apply(AttendanceChange::Status(FilterValue::Only(AttendanceStatus::Present)));
        query.offset = 40;
        query.search_term = "raw".to_string();
        query.debounced_search_term = "ali".to_string();

        assert_eq!(
            query
                .build_query_params(PaginationStyle::LimitOffset)
                .to_query_string(),
            "status=present&search=ali&limit=20&offset=40"
        );
        assert_eq!(
            query
                .build_query_params(PaginationStyle::PageNumber)
                .to_query_string(),
            "status=present&search=ali&page=3&page_size=20"
        );
    }

    #[test]
    fn test_url_params_omit_defaults() {
        let mut query = ListQuery::<AttendanceFilters>::new(10);
        assert!(query
            .to_url_params(PaginationStyle::LimitOffset, 10)
            .is_empty());

        query.page_size = 20;
        assert_eq!(
            query
                .to_url_params(PaginationStyle::LimitOffset, 10)
                .to_query_string(),
            "limit=20"
        );

        query.offset = 40;
        assert_eq!(
            query
                .to_url_params(PaginationStyle::LimitOffset, 10)
                .to_query_string(),
            "limit=20&offset=40"
        );
    }

    #[test]
    fn test_rehydrate_from_address_bar() {
        let listing = ListingSettings::default();
        let query = ListQuery::<AttendanceFilters>::from_query_string(
            "?status=present&limit=20&offset=45&ordering=-date",
            PaginationStyle::LimitOffset,
            &listing,
        );
        assert_eq!(query.page_size, 20);
        assert_eq!(query.offset, 40);
        assert_eq!(query.ordering, Some(Ordering::desc("date")));
        assert_eq!(
            query.filters.status,
            FilterValue::Only(AttendanceStatus::Present)
        );
    }

    #[test]
    fn test_rehydrate_rejects_unknown_page_size() {
        let listing = ListingSettings::default();
        let query = ListQuery::<AttendanceFilters>::from_query_string(
            "page=2&page_size=7",
            PaginationStyle::PageNumber,
            &listing,
        );
        assert_eq!(query.page_size, 10);
        assert_eq!(query.page(), 2);
    }
}
