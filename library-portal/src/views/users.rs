use crate::models::filters::{filter_enum, ActiveFilter, FilterSet, FilterValue};
use crate::models::query::PaginationStyle;
use crate::services::gateway::ListEndpoint;
use crate::utils::QueryParams;

filter_enum! {
    UserRole {
        Student => "student", "Student";
        Teacher => "teacher", "Teacher";
        Admin => "admin", "Admin";
        SuperAdmin => "super_admin", "Super admin";
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilters {
    pub role: FilterValue<UserRole>,
    /// Free-text match on the e-mail address.
    pub email: FilterValue<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserKey {
    Role,
    Email,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserChange {
    Role(FilterValue<UserRole>),
    Email(FilterValue<String>),
}

impl FilterSet for UserFilters {
    type Key = UserKey;
    type Change = UserChange;

    const SEARCH_PARAM: &'static str = "full_name";

    fn apply(&mut self, change: UserChange) {
        match change {
            UserChange::Role(v) => self.role = v,
            UserChange::Email(v) => self.email = v,
        }
    }

    fn clear(&mut self, key: UserKey) {
        match key {
            UserKey::Role => self.role = FilterValue::All,
            UserKey::Email => self.email = FilterValue::All,
        }
    }

    fn write_params(&self, params: &mut QueryParams) {
        self.role.write("role", params);
        self.email.write("email", params);
    }

    fn from_params(params: &QueryParams) -> Self {
        Self {
            role: FilterValue::parse(params.get("role")),
            email: FilterValue::parse(params.get("email")),
        }
    }

    fn active(&self) -> Vec<ActiveFilter<UserKey>> {
        [
            ActiveFilter::describe(UserKey::Role, "Role", &self.role),
            ActiveFilter::describe(UserKey::Email, "Email", &self.email),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

pub fn endpoint() -> ListEndpoint {
    ListEndpoint::new("/users/", PaginationStyle::PageNumber)
}
