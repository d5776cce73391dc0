use crate::models::filters::{filter_enum, ActiveFilter, FilterSet, FilterValue};
use crate::models::query::PaginationStyle;
use crate::services::gateway::ListEndpoint;
use crate::utils::QueryParams;

filter_enum! {
    EnrollmentStatus {
        Pending => "pending", "Pending";
        Approved => "approved", "Approved";
        Rejected => "rejected", "Rejected";
        Cancelled => "cancelled", "Cancelled";
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrollmentFilters {
    pub status: FilterValue<EnrollmentStatus>,
    pub course: FilterValue<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentKey {
    Status,
    Course,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnrollmentChange {
    Status(FilterValue<EnrollmentStatus>),
    Course(FilterValue<u64>),
}

impl FilterSet for EnrollmentFilters {
    type Key = EnrollmentKey;
    type Change = EnrollmentChange;

    const SEARCH_PARAM: &'static str = "search";

    fn apply(&mut self, change: EnrollmentChange) {
        match change {
            EnrollmentChange::Status(v) => self.status = v,
            EnrollmentChange::Course(v) => self.course = v,
        }
    }

    fn clear(&mut self, key: EnrollmentKey) {
        match key {
            EnrollmentKey::Status => self.status = FilterValue::All,
            EnrollmentKey::Course => self.course = FilterValue::All,
        }
    }

    fn write_params(&self, params: &mut QueryParams) {
        self.status.write("status", params);
        self.course.write("course", params);
    }

    fn from_params(params: &QueryParams) -> Self {
        Self {
            status: FilterValue::parse(params.get("status")),
            course: FilterValue::parse(params.get("course")),
        }
    }

    fn active(&self) -> Vec<ActiveFilter<EnrollmentKey>> {
        [
            ActiveFilter::describe(EnrollmentKey::Status, "Status", &self.status),
            ActiveFilter::describe(EnrollmentKey::Course, "Course", &self.course),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

pub fn endpoint() -> ListEndpoint {
    ListEndpoint::new("/enrollments/", PaginationStyle::PageNumber)
}
