//! Typed filter values and the per-page filter-set contract.

use crate::utils::QueryParams;
use chrono::NaiveDate;
use std::fmt;

/// A value that can travel as a single query parameter.
pub trait FilterParam: Sized {
    fn to_param(&self) -> String;
    fn from_param(raw: &str) -> Option<Self>;

    /// Text for the active-filter chip.
    fn label(&self) -> String {
        self.to_param()
    }
}

impl FilterParam for String {
    fn to_param(&self) -> String {
        self.trim().to_string()
    }

    fn from_param(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        (!raw.is_empty()).then(|| raw.to_string())
    }
}

impl FilterParam for u64 {
    fn to_param(&self) -> String {
        self.to_string()
    }

    fn from_param(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl FilterParam for NaiveDate {
    fn to_param(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }

    fn from_param(raw: &str) -> Option<Self> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
    }
}

/// Sentinel-aware filter slot. `All` means "no filter" and is never sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterValue<T> {
    #[default]
    All,
    Only(T),
}

impl<T: FilterParam> FilterValue<T> {
    pub fn is_all(&self) -> bool {
        self.as_param().is_none()
    }

    /// `None` for `All` and for values that serialise blank.
    pub fn as_param(&self) -> Option<String> {
        match self {
            FilterValue::All => None,
            FilterValue::Only(value) => {
                let param = value.to_param();
                (!param.is_empty()).then_some(param)
            }
        }
    }

    /// Missing, blank, `"all"` or unparseable input all mean `All`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => FilterValue::All,
            Some(raw) if raw.trim().is_empty() || raw.trim().eq_ignore_ascii_case("all") => {
                FilterValue::All
            }
            Some(raw) => T::from_param(raw).map_or(FilterValue::All, FilterValue::Only),
        }
    }

    pub fn write(&self, key: &str, params: &mut QueryParams) {
        params.push_opt(key, self.as_param());
    }

    pub fn label(&self) -> Option<String> {
        match self {
            FilterValue::Only(value) if !self.is_all() => Some(value.label()),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for FilterValue<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(FilterValue::All, FilterValue::Only)
    }
}

/// One removable chip describing a filter that is currently narrowing the
/// list. Removing it is `ListQueryController::remove_filter(key)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFilter<K> {
    pub key: K,
    pub label: String,
}

impl<K> ActiveFilter<K> {
    /// `Some("Status: Present")` for a set slot, `None` for `All`.
    pub fn describe<T: FilterParam>(key: K, name: &str, value: &FilterValue<T>) -> Option<Self> {
        value.label().map(|label| Self {
            key,
            label: format!("{}: {}", name, label),
        })
    }
}

/// The filters one list page understands.
///
/// `Key` names each slot and `Change` pairs a key with a typed value, so a
/// page cannot set a filter it does not have.
pub trait FilterSet: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    type Key: Copy + Eq + fmt::Debug + Send + Sync + 'static;
    type Change: Clone + fmt::Debug + Send + Sync + 'static;

    /// Parameter that carries the free-text search for this page.
    const SEARCH_PARAM: &'static str;

    fn apply(&mut self, change: Self::Change);
    fn clear(&mut self, key: Self::Key);

    /// Append every non-`All` filter to `params`.
    fn write_params(&self, params: &mut QueryParams);
    fn from_params(params: &QueryParams) -> Self;
    fn active(&self) -> Vec<ActiveFilter<Self::Key>>;

    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Declare a closed set of filter options with their wire values and labels.
macro_rules! filter_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $param:literal, $label:literal;)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const OPTIONS: &'static [$name] = &[$($name::$variant),+];
        }

        impl $crate::models::filters::FilterParam for $name {
            fn to_param(&self) -> String {
                match self {
                    $($name::$variant => $param.to_string()),+
                }
            }

            fn from_param(raw: &str) -> Option<Self> {
                match raw.trim().to_ascii_lowercase().as_str() {
                    $($param => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn label(&self) -> String {
                match self {
                    $($name::$variant => $label.to_string()),+
                }
            }
        }
    };
}

pub(crate) use filter_enum;

#[cfg(test)]
mod tests {
    use super::*;

    filter_enum! {
        Colour {
            Red => "red", "Red";
            Blue => "blue", "Blue";
        }
    }

    #[test]
    fn test_all_sentinel_is_never_written() {
        let mut params = QueryParams::new();
        FilterValue::<Colour>::All.write("colour", &mut params);
        FilterValue::Only(String::new()).write("title", &mut params);
        assert!(params.is_empty());
    }

    #[test]
    fn test_parse_treats_all_and_garbage_as_unset() {
        assert_eq!(FilterValue::<Colour>::parse(Some("all")), FilterValue::All);
        assert_eq!(FilterValue::<Colour>::parse(Some("ALL")), FilterValue::All);
        assert_eq!(FilterValue::<Colour>::parse(Some("")), FilterValue::All);
        assert_eq!(FilterValue::<Colour>::parse(Some("green")), FilterValue::All);
        assert_eq!(
            FilterValue::<Colour>::parse(Some("Blue")),
            FilterValue::Only(Colour::Blue)
        );
    }

    #[test]
    fn test_dates_use_iso_format() {
        let value = FilterValue::Only(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(value.as_param().as_deref(), Some("2024-03-09"));
        assert_eq!(FilterValue::<NaiveDate>::parse(Some("2024-03-09")), value);
    }

    #[test]
    fn test_label_uses_display_text() {
        assert_eq!(FilterValue::Only(Colour::Red).label().as_deref(), Some("Red"));
        assert_eq!(FilterValue::<Colour>::All.label(), None);
    }
}
