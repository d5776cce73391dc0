use super::Language;
use crate::models::filters::{ActiveFilter, FilterSet, FilterValue};
use crate::models::query::PaginationStyle;
use crate::services::gateway::ListEndpoint;
use crate::utils::QueryParams;

/// Filters of the public digital-library catalog and its admin twin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryFilters {
    pub category: FilterValue<u64>,
    pub language: FilterValue<Language>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryKey {
    Category,
    Language,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LibraryChange {
    Category(FilterValue<u64>),
    Language(FilterValue<Language>),
}

impl FilterSet for LibraryFilters {
    type Key = LibraryKey;
    type Change = LibraryChange;

    const SEARCH_PARAM: &'static str = "search";

    fn apply(&mut self, change: LibraryChange) {
        match change {
            LibraryChange::Category(v) => self.category = v,
            LibraryChange::Language(v) => self.language = v,
        }
    }

    fn clear(&mut self, key: LibraryKey) {
        match key {
            LibraryKey::Category => self.category = FilterValue::All,
            LibraryKey::Language => self.language = FilterValue::All,
        }
    }

    fn write_params(&self, params: &mut QueryParams) {
        self.category.write("category", params);
        self.language.write("language", params);
    }

    fn from_params(params: &QueryParams) -> Self {
        Self {
            category: FilterValue::parse(params.get("category")),
            language: FilterValue::parse(params.get("language")),
        }
    }

    fn active(&self) -> Vec<ActiveFilter<LibraryKey>> {
        [
            ActiveFilter::describe(LibraryKey::Category, "Category", &self.category),
            ActiveFilter::describe(LibraryKey::Language, "Language", &self.language),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

pub fn endpoint() -> ListEndpoint {
    ListEndpoint::new("/library/resources/", PaginationStyle::LimitOffset)
}

/// Detail path of a single library resource.
pub fn resource_path(resource_id: u64) -> String {
    format!("/library/resources/{}/", resource_id)
}
