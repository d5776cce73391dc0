//! REST client for the portal API.

use crate::config::ApiSettings;
use crate::models::auth::AuthContext;
use crate::utils::QueryParams;
use reqwest::{Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use service_core::error::AppError;
use service_core::http::{retry_http_call, RetryConfig};
use service_core::observability::TracedClientExt;

pub struct ApiClient {
    client: Client,
    base_url: String,
    retry: RetryConfig,
    auth: Option<AuthContext>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, AppError> {
        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            retry: settings.retry.clone(),
            auth: None,
        })
    }

    /// Attach the caller's identity; every request then carries its token.
    pub fn with_auth(mut self, auth: AuthContext) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn auth(&self) -> Option<&AuthContext> {
        self.auth.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` with `params`, retrying transient failures.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<T, AppError> {
        let url = self.url_for(path);
        let url = url.as_str();
        retry_http_call(&self.retry, path, || async move {
            let request = self
                .client
                .traced_get(url)
                .query(params)
                .maybe_bearer_auth(self.bearer());
            tracing::debug!(
                url = %url,
                query = %params.to_query_string(),
                request_id = %request.request_id(),
                "GET"
            );
            let response = request.send().await.map_err(|e| {
                tracing::error!("Failed to send GET request to {}: {}", url, e);
                AppError::Transport(e)
            })?;
            Self::handle_response(response).await
        })
        .await
    }

    /// GET a ready-made URL handed out by the API (pagination cursors).
    ///
    /// The token is only attached when the URL points at the API host.
    pub async fn get_absolute<T: DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let same_host = self.is_api_url(url);
        if !same_host {
            tracing::warn!(url = %url, "Cursor points outside the API host; sending without token");
        }

        retry_http_call(&self.retry, "cursor", || async move {
            let bearer = if same_host { self.bearer() } else { None };
            let response = self
                .client
                .traced_get(url)
                .maybe_bearer_auth(bearer)
                .send()
                .await
                .map_err(|e| {
                    tracing::error!("Failed to follow cursor {}: {}", url, e);
                    AppError::Transport(e)
                })?;
            Self::handle_response(response).await
        })
        .await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = self.url_for(path);
        let response = self
            .client
            .traced_post(&url)
            .json(body)
            .maybe_bearer_auth(self.bearer())
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                AppError::Transport(e)
            })?;
        Self::handle_response(response).await
    }

    pub async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = self.url_for(path);
        let response = self
            .client
            .traced_patch(&url)
            .json(body)
            .maybe_bearer_auth(self.bearer())
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send PATCH request to {}: {}", url, e);
                AppError::Transport(e)
            })?;
        Self::handle_response(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), AppError> {
        let url = self.url_for(path);
        let response = self
            .client
            .traced_delete(&url)
            .maybe_bearer_auth(self.bearer())
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send DELETE request to {}: {}", url, e);
                AppError::Transport(e)
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::from_status(status.as_u16(), &body))
    }

    fn bearer(&self) -> Option<&str> {
        self.auth.as_ref().map(AuthContext::bearer)
    }

    fn is_api_url(&self, url: &str) -> bool {
        match (Url::parse(url), Url::parse(&self.base_url)) {
            (Ok(target), Ok(base)) => {
                target.host_str() == base.host_str()
                    && target.port_or_known_default() == base.port_or_known_default()
            }
            _ => false,
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if status.is_server_error() {
                tracing::error!(status = status.as_u16(), "API returned server error");
            } else {
                tracing::warn!(status = status.as_u16(), "API rejected request");
            }
            return Err(AppError::from_status(status.as_u16(), &body));
        }

        // 204 and empty bodies decode as JSON null
        let body = if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
            "null"
        } else {
            body.as_str()
        };

        Ok(serde_json::from_str(body)?)
    }
}
