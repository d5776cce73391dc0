use crate::models::filters::{filter_enum, ActiveFilter, FilterSet, FilterValue};
use crate::models::query::PaginationStyle;
use crate::services::gateway::ListEndpoint;
use crate::utils::QueryParams;
use chrono::NaiveDate;

filter_enum! {
    AttendanceStatus {
        Present => "present", "Present";
        Absent => "absent", "Absent";
        Late => "late", "Late";
        Excused => "excused", "Excused";
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceFilters {
    pub status: FilterValue<AttendanceStatus>,
    pub date_from: FilterValue<NaiveDate>,
    pub date_to: FilterValue<NaiveDate>,
    pub student: FilterValue<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceKey {
    Status,
    DateFrom,
    DateTo,
    Student,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttendanceChange {
    Status(FilterValue<AttendanceStatus>),
    DateFrom(FilterValue<NaiveDate>),
    DateTo(FilterValue<NaiveDate>),
    Student(FilterValue<u64>),
}

impl FilterSet for AttendanceFilters {
    type Key = AttendanceKey;
    type Change = AttendanceChange;

    const SEARCH_PARAM: &'static str = "search";

    fn apply(&mut self, change: AttendanceChange) {
        match change {
            AttendanceChange::Status(v) => self.status = v,
            AttendanceChange::DateFrom(v) => self.date_from = v,
            AttendanceChange::DateTo(v) => self.date_to = v,
            AttendanceChange::Student(v) => self.student = v,
        }
    }

    fn clear(&mut self, key: AttendanceKey) {
        match key {
            AttendanceKey::Status => self.status = FilterValue::All,
            AttendanceKey::DateFrom => self.date_from = FilterValue::All,
            AttendanceKey::DateTo => self.date_to = FilterValue::All,
            AttendanceKey::Student => self.student = FilterValue::All,
        }
    }

    fn write_params(&self, params: &mut QueryParams) {
        self.status.write("status", params);
        self.date_from.write("date_from", params);
        self.date_to.write("date_to", params);
        self.student.write("student", params);
    }

    fn from_params(params: &QueryParams) -> Self {
        Self {
            status: FilterValue::parse(params.get("status")),
            date_from: FilterValue::parse(params.get("date_from")),
            date_to: FilterValue::parse(params.get("date_to")),
            student: FilterValue::parse(params.get("student")),
        }
    }

    fn active(&self) -> Vec<ActiveFilter<AttendanceKey>> {
        [
            ActiveFilter::describe(AttendanceKey::Status, "Status", &self.status),
            ActiveFilter::describe(AttendanceKey::DateFrom, "From", &self.date_from),
            ActiveFilter::describe(AttendanceKey::DateTo, "To", &self.date_to),
            ActiveFilter::describe(AttendanceKey::Student, "Student", &self.student),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Attendance records of one course, paged by limit/offset.
pub fn endpoint(course_id: u64) -> ListEndpoint {
    ListEndpoint::new("/attendance/", PaginationStyle::LimitOffset).scoped("course", course_id)
}
