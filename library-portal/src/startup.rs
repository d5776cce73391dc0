use crate::config::Settings;
use crate::models::auth::{AuthContext, TokenStore};
use crate::models::filters::FilterSet;
use crate::models::query::ListQuery;
use crate::services::api_client::ApiClient;
use crate::services::controller::ListQueryController;
use crate::services::gateway::{HttpListGateway, ListEndpoint};
use crate::services::url_sync::{LocationBar, UrlStateSync};
use chrono::Utc;
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use service_core::observability::init_tracing;
use std::sync::Arc;

/// Install logging and optional trace export from the loaded settings.
pub fn init_telemetry(settings: &Settings) {
    let telemetry = &settings.telemetry;
    init_tracing(
        &telemetry.service_name,
        &telemetry.log_level,
        telemetry.otlp_endpoint.as_deref(),
    );
}

/// Everything a signed-in page needs: settings and an authenticated client.
pub struct Portal {
    settings: Settings,
    api: Arc<ApiClient>,
}

impl Portal {
    /// Resolve the caller from `store` and build the API client around it.
    /// Fails with `Unauthorized` when there is no usable token.
    pub fn build(settings: Settings, store: &dyn TokenStore) -> Result<Self, AppError> {
        let auth = AuthContext::from_store(store, Utc::now()).map_err(|e| {
            tracing::warn!(error = %e, "No usable session, login required");
            AppError::from(e)
        })?;
        tracing::info!(user_id = %auth.user_id, role = ?auth.role, "Session restored");

        let api = ApiClient::new(&settings.api)?.with_auth(auth);
        Ok(Self {
            settings,
            api: Arc::new(api),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    /// Controller for one list page, its query rebuilt from `location`.
    pub fn list_controller<F, T, L>(
        &self,
        endpoint: ListEndpoint,
        location: &L,
    ) -> ListQueryController<F, T>
    where
        F: FilterSet,
        T: DeserializeOwned + Clone + Send + Sync + 'static,
        L: LocationBar,
    {
        let listing = self.settings.listing.clone();
        let query = ListQuery::from_query_string(&location.query(), endpoint.style, &listing);
        let gateway = Arc::new(HttpListGateway::<T>::new(self.api.clone()));
        ListQueryController::with_query(endpoint, gateway, listing, query)
    }

    pub fn url_sync<L: LocationBar>(
        &self,
        endpoint: &ListEndpoint,
        location: Arc<L>,
    ) -> UrlStateSync<L> {
        UrlStateSync::new(
            location,
            endpoint.style,
            self.settings.listing.default_page_size,
        )
    }
}
