#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::loader::DEFAULT_PAGE_SIZE;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, SelectorError};
use crate::utils::validation::{self, Validate};

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use toml_config::TomlConfig;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const MAX_TIMEOUT_SECONDS: u64 = 600;

/// Effective settings after layering command line flags over a config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub page_size: usize,
    pub timeout_seconds: u64,
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            api_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl From<&TomlConfig> for Settings {
    fn from(config: &TomlConfig) -> Self {
        Self {
            api_base_url: config.api_base_url().to_string(),
            api_token: config.api_token().map(str::to_string),
            page_size: config.page_size(),
            timeout_seconds: config.timeout_seconds(),
            log_level: config.log_level().to_string(),
            json_logs: config.json_logs(),
        }
    }
}

impl ConfigProvider for Settings {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

pub(crate) fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    if config.api_base_url().trim().is_empty() {
        return Err(SelectorError::MissingConfigError {
            field: "api.base_url".to_string(),
        });
    }
    validation::validate_url("api.base_url", config.api_base_url())?;
    validation::validate_positive_number("loader.page_size", config.page_size(), 1)?;
    validation::validate_range(
        "api.timeout_seconds",
        config.timeout_seconds(),
        1,
        MAX_TIMEOUT_SECONDS,
    )?;
    if let Some(token) = config.api_token() {
        validation::validate_non_empty_string("api.token", token)?;
    }
    Ok(())
}
