use serde::Deserialize;
use service_core::config::{configuration_directory, load_layered, TelemetrySettings};
use service_core::error::AppError;
use service_core::http::RetryConfig;
use std::path::Path;
use std::time::Duration;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub api: ApiSettings,
    #[serde(default)]
    pub listing: ListingSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApiSettings {
    /// Root of the REST API, e.g. `http://localhost:8000/api`.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_timeout_secs() -> u64 {
    30
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ListingSettings {
    /// Quiet period after the last keystroke before a search is sent.
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<u32>,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_page_size_options() -> Vec<u32> {
    vec![5, 10, 20, 50]
}

fn default_page_size() -> u32 {
    10
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_search_debounce_ms(),
            page_size_options: default_page_size_options(),
            default_page_size: default_page_size(),
        }
    }
}

impl ListingSettings {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn is_allowed_page_size(&self, size: u32) -> bool {
        self.page_size_options.contains(&size)
    }

    /// The default page size must be non-zero and one of the options.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.page_size_options.iter().any(|&s| s == 0) {
            return Err(AppError::Config(anyhow::anyhow!(
                "listing.page_size_options must be positive"
            )));
        }
        if !self.is_allowed_page_size(self.default_page_size) {
            return Err(AppError::Config(anyhow::anyhow!(
                "listing.default_page_size {} is not in {:?}",
                self.default_page_size,
                self.page_size_options
            )));
        }
        Ok(())
    }
}

/// Load settings from `library-portal/config/base.yaml` plus `APP_*` env vars.
pub fn get_configuration() -> Result<Settings, AppError> {
    let directory = configuration_directory("library-portal")?;
    load_settings_from(&directory)
}

pub fn load_settings_from(directory: &Path) -> Result<Settings, AppError> {
    let settings: Settings = load_layered(directory)?;
    settings.listing.validate()?;
    Ok(settings)
}
