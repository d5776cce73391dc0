use super::Language;
use crate::models::filters::{ActiveFilter, FilterSet, FilterValue};
use crate::models::query::PaginationStyle;
use crate::services::gateway::ListEndpoint;
use crate::utils::QueryParams;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingFilters {
    pub subject: FilterValue<u64>,
    pub language: FilterValue<Language>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingKey {
    Subject,
    Language,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordingChange {
    Subject(FilterValue<u64>),
    Language(FilterValue<Language>),
}

impl FilterSet for RecordingFilters {
    type Key = RecordingKey;
    type Change = RecordingChange;

    // recordings are searched by title only
    const SEARCH_PARAM: &'static str = "title";

    fn apply(&mut self, change: RecordingChange) {
        match change {
            RecordingChange::Subject(v) => self.subject = v,
            RecordingChange::Language(v) => self.language = v,
        }
    }

    fn clear(&mut self, key: RecordingKey) {
        match key {
            RecordingKey::Subject => self.subject = FilterValue::All,
            RecordingKey::Language => self.language = FilterValue::All,
        }
    }

    fn write_params(&self, params: &mut QueryParams) {
        self.subject.write("subject", params);
        self.language.write("language", params);
    }

    fn from_params(params: &QueryParams) -> Self {
        Self {
            subject: FilterValue::parse(params.get("subject")),
            language: FilterValue::parse(params.get("language")),
        }
    }

    fn active(&self) -> Vec<ActiveFilter<RecordingKey>> {
        [
            ActiveFilter::describe(RecordingKey::Subject, "Subject", &self.subject),
            ActiveFilter::describe(RecordingKey::Language, "Language", &self.language),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Session recordings, optionally limited to one course.
pub fn endpoint(course_id: Option<u64>) -> ListEndpoint {
    let endpoint = ListEndpoint::new("/recordings/", PaginationStyle::PageNumber);
    match course_id {
        Some(id) => endpoint.scoped("course", id),
        None => endpoint,
    }
}
