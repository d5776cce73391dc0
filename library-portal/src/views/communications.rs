use crate::models::filters::{filter_enum, ActiveFilter, FilterSet, FilterValue};
use crate::models::query::PaginationStyle;
use crate::services::gateway::ListEndpoint;
use crate::utils::QueryParams;
use chrono::NaiveDate;

filter_enum! {
    CommunicationType {
        Inquiry => "inquiry", "Inquiry";
        Complaint => "complaint", "Complaint";
        Suggestion => "suggestion", "Suggestion";
        Feedback => "feedback", "Feedback";
        BugReport => "bug_report", "Bug report";
    }
}

filter_enum! {
    CommunicationStatus {
        Pending => "pending", "Pending";
        InProgress => "in_progress", "In progress";
        Resolved => "resolved", "Resolved";
        Closed => "closed", "Closed";
    }
}

/// Filters of the super-admin communications inbox.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommunicationFilters {
    pub communication_type: FilterValue<CommunicationType>,
    pub status: FilterValue<CommunicationStatus>,
    pub date_from: FilterValue<NaiveDate>,
    pub date_to: FilterValue<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommunicationKey {
    Type,
    Status,
    DateFrom,
    DateTo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommunicationChange {
    Type(FilterValue<CommunicationType>),
    Status(FilterValue<CommunicationStatus>),
    DateFrom(FilterValue<NaiveDate>),
    DateTo(FilterValue<NaiveDate>),
}

impl FilterSet for CommunicationFilters {
    type Key = CommunicationKey;
    type Change = CommunicationChange;

    const SEARCH_PARAM: &'static str = "search";

    fn apply(&mut self, change: CommunicationChange) {
        match change {
            CommunicationChange::Type(v) => self.communication_type = v,
            CommunicationChange::Status(v) => self.status = v,
            CommunicationChange::DateFrom(v) => self.date_from = v,
            CommunicationChange::DateTo(v) => self.date_to = v,
        }
    }

    fn clear(&mut self, key: CommunicationKey) {
        match key {
            CommunicationKey::Type => self.communication_type = FilterValue::All,
            CommunicationKey::Status => self.status = FilterValue::All,
            CommunicationKey::DateFrom => self.date_from = FilterValue::All,
            CommunicationKey::DateTo => self.date_to = FilterValue::All,
        }
    }

    fn write_params(&self, params: &mut QueryParams) {
        self.communication_type.write("communication_type", params);
        // the inbox matches status case-insensitively
        self.status.write("status__iexact", params);
        self.date_from.write("date_from", params);
        self.date_to.write("date_to", params);
    }

    fn from_params(params: &QueryParams) -> Self {
        Self {
            communication_type: FilterValue::parse(params.get("communication_type")),
            status: FilterValue::parse(params.get("status__iexact")),
            date_from: FilterValue::parse(params.get("date_from")),
            date_to: FilterValue::parse(params.get("date_to")),
        }
    }

    fn active(&self) -> Vec<ActiveFilter<CommunicationKey>> {
        [
            ActiveFilter::describe(CommunicationKey::Type, "Type", &self.communication_type),
            ActiveFilter::describe(CommunicationKey::Status, "Status", &self.status),
            ActiveFilter::describe(CommunicationKey::DateFrom, "From", &self.date_from),
            ActiveFilter::describe(CommunicationKey::DateTo, "To", &self.date_to),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

pub fn endpoint() -> ListEndpoint {
    ListEndpoint::new("/communications/", PaginationStyle::PageNumber)
}
