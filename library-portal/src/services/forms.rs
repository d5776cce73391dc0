//! Form submission and mapping of server-side field errors back onto forms.

use crate::models::filters::FilterParam;
use crate::services::api_client::ApiClient;
use crate::views::communications::CommunicationType;
use serde::Serialize;
use serde_json::Value;
use service_core::error::AppError;
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

/// Payload keys that hold errors not tied to one field.
const GENERAL_KEYS: &[&str] = &["non_field_errors", "detail", "error", "message"];

/// Errors to show on a form: per field where the field is known, otherwise
/// one general message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub fields: BTreeMap<String, Vec<String>>,
    pub general: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_none()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    /// Map a Django REST framework error body onto `known_fields`.
    pub fn from_payload(payload: &Value, known_fields: &[&str]) -> Self {
        let mut errors = FormErrors::default();
        let mut general = Vec::new();

        match payload {
            Value::Object(map) => {
                for (key, value) in map {
                    let messages = messages_of(value);
                    if messages.is_empty() {
                        continue;
                    }
                    if known_fields.contains(&key.as_str()) {
                        errors.fields.insert(key.clone(), messages);
                    } else if GENERAL_KEYS.contains(&key.as_str()) {
                        general.extend(messages);
                    } else {
                        tracing::debug!(field = %key, "Server error for a field the form does not show");
                        general.extend(messages.into_iter().map(|m| format!("{}: {}", key, m)));
                    }
                }
            }
            other => general.extend(messages_of(other)),
        }

        if !general.is_empty() {
            errors.general = Some(general.join(" "));
        } else if errors.fields.is_empty() {
            errors.general = Some("The form could not be submitted.".to_string());
        }
        errors
    }

    pub fn from_validation(validation: &ValidationErrors) -> Self {
        let fields = validation
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => format!("Invalid value ({})", e.code),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        FormErrors {
            fields,
            general: None,
        }
    }

    /// Anything that is not a field-level error becomes a toast-level message.
    pub fn from_app_error(err: &AppError, known_fields: &[&str]) -> Self {
        match err {
            AppError::Validation(validation) => Self::from_validation(validation),
            AppError::FieldErrors(payload) => Self::from_payload(payload, known_fields),
            other => FormErrors {
                fields: BTreeMap::new(),
                general: Some(other.user_message()),
            },
        }
    }
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(messages_of).collect(),
        Value::Object(map) => map.values().flat_map(messages_of).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// The bug / feedback report a signed-in user can send from any page.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct BugReportForm {
    #[validate(length(min = 3, max = 200, message = "Title must be 3 to 200 characters."))]
    pub title: String,
    #[validate(length(min = 10, max = 5000, message = "Describe the problem in at least 10 characters."))]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Enter a valid e-mail address."))]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Enter a valid page address."))]
    pub page_url: Option<String>,
}

impl BugReportForm {
    pub const FIELDS: &'static [&'static str] = &["title", "description", "contact_email", "page_url"];
}

#[derive(Serialize)]
struct BugReportRequest<'a> {
    #[serde(flatten)]
    form: &'a BugReportForm,
    communication_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
}

/// Validate locally, then file the report as a communication.
pub async fn submit_bug_report(api: &ApiClient, form: &BugReportForm) -> Result<Value, AppError> {
    form.validate()?;

    let request = BugReportRequest {
        form,
        communication_type: CommunicationType::BugReport.to_param(),
        user: api.auth().map(|auth| auth.user_id.as_str()),
    };

    let created: Value = api.post_json("/communications/", &request).await?;
    let id = created.get("id").cloned().unwrap_or(Value::Null);
    tracing::info!(id = %id, "Bug report submitted");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_fields_are_mapped() {
        let payload = json!({
            "title": ["This field may not be blank."],
            "non_field_errors": ["Duplicate report."],
            "priority": ["Not a valid choice."]
        });
        let errors = FormErrors::from_payload(&payload, BugReportForm::FIELDS);

        assert_eq!(
            errors.field("title"),
            Some(&["This field may not be blank.".to_string()][..])
        );
        let general = errors.general.unwrap();
        assert!(general.contains("Duplicate report."));
        assert!(general.contains("priority: Not a valid choice."));
    }

    #[test]
    fn test_unmapped_payload_falls_back_to_generic_message() {
        let errors = FormErrors::from_payload(&json!({}), BugReportForm::FIELDS);
        assert!(errors.fields.is_empty());
        assert_eq!(
            errors.general.as_deref(),
            Some("The form could not be submitted.")
        );
    }

    #[test]
    fn test_client_side_validation() {
        let form = BugReportForm {
            title: "x".to_string(),
            description: "Search page crashes".to_string(),
            contact_email: Some("not-an-email".to_string()),
            page_url: None,
        };
        let err = form.validate().unwrap_err();
        let errors = FormErrors::from_validation(&err);
        assert!(errors.field("title").is_some());
        assert!(errors.field("contact_email").is_some());
        assert!(errors.field("description").is_none());
    }

    #[test]
    fn test_transport_errors_become_general_message() {
        let err = AppError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        let errors = FormErrors::from_app_error(&err, BugReportForm::FIELDS);
        assert!(errors.fields.is_empty());
        assert!(errors.general.is_some());
    }
}
