use crate::services::api_client::ApiClient;
use crate::utils::QueryParams;
use serde::de::DeserializeOwned;
use service_core::error::AppError;

/// A single-resource view either has its record or shows a not-found card.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail<T> {
    Found(T),
    NotFound,
}

impl<T> Detail<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Detail::Found(value) => Some(value),
            Detail::NotFound => None,
        }
    }
}

/// Load one record. A 404 is a normal outcome here, not an error.
pub async fn load_detail<T: DeserializeOwned>(
    api: &ApiClient,
    path: &str,
) -> Result<Detail<T>, AppError> {
    match api.get_json(path, &QueryParams::new()).await {
        Ok(value) => Ok(Detail::Found(value)),
        Err(AppError::NotFound(reason)) => {
            tracing::info!(path = %path, reason = %reason, "Resource not found");
            Ok(Detail::NotFound)
        }
        Err(err) => Err(err),
    }
}

/// The signed-in user's profile.
pub async fn load_profile<T: DeserializeOwned>(api: &ApiClient) -> Result<Detail<T>, AppError> {
    if api.auth().is_none() {
        return Err(AppError::Unauthorized("no access token in session".to_string()));
    }
    load_detail(api, "/users/me/").await
}
