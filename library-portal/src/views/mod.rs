//! Filter sets and endpoints for each list page of the portal.
pub mod attendance;
pub mod communications;
pub mod enrollments;
pub mod library;
pub mod recordings;
pub mod users;

use crate::models::filters::filter_enum;

filter_enum! {
    /// Content language, shared by recordings and library resources.
    Language {
        Arabic => "ar", "Arabic";
        English => "en", "English";
        Urdu => "ur", "Urdu";
        French => "fr", "French";
        Turkish => "tr", "Turkish";
    }
}
