use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::core::config::data::Config;
use crate::core::config::io::ConfigError;
use crate::core::keyring::CredentialStore;
use crate::core::models::resolve_api_model;

/// Everything one completion request needs from the user's settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub model_label: String,
    pub api_model_id: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
    pub credential_override: Option<String>,
    pub timeout: Duration,
}

impl RequestConfig {
    pub fn from_config(config: &Config, credential_override: Option<String>) -> Self {
        let model_label = config.model_label().to_string();
        Self {
            api_model_id: resolve_api_model(&model_label).to_string(),
            model_label,
            temperature: config.effective_temperature(),
            max_tokens: config.effective_max_tokens(),
            system_prompt: config.effective_system_prompt().map(str::to_string),
            credential_override,
            timeout: config.effective_timeout(),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self::from_config(&Config::default(), None)
    }
}

/// Source of a fresh [`RequestConfig`] for every request.
pub trait SettingsProvider: Send + Sync {
    fn request_config(&self) -> Result<RequestConfig, ConfigError>;
}

/// A fixed configuration, mostly useful for one-shot commands and tests.
impl SettingsProvider for RequestConfig {
    fn request_config(&self) -> Result<RequestConfig, ConfigError> {
        Ok(self.clone())
    }
}

/// Reads `config.toml` from disk on every request, so edits made while the
/// client is running apply to the next message.
pub struct FileSettings {
    path: PathBuf,
    credentials: Option<CredentialStore>,
    model_override: Option<String>,
}

impl FileSettings {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: None,
            model_override: None,
        }
    }

    /// Use `label` instead of the configured model for this session.
    pub fn with_model(mut self, label: impl Into<String>) -> Self {
        self.model_override = Some(label.into());
        self
    }

    /// Also consult the keyring when the config file has no `api_key`.
    pub fn with_keyring(mut self, store: CredentialStore) -> Self {
        self.credentials = Some(store);
        self
    }

    fn keyring_override(&self) -> Option<String> {
        let store = self.credentials.as_ref()?;
        match store.load() {
            Ok(token) => token.filter(|token| !token.trim().is_empty()),
            Err(err) => {
                warn!("keyring unavailable, ignoring stored api key: {err}");
                None
            }
        }
    }
}

impl SettingsProvider for FileSettings {
    fn request_config(&self) -> Result<RequestConfig, ConfigError> {
        let mut config = Config::load_from_path(&self.path)?;
        if let Some(label) = &self.model_override {
            config.model = Some(label.clone());
        }
        let credential = config
            .api_key_override()
            .map(str::to_string)
            .or_else(|| self.keyring_override());
        Ok(RequestConfig::from_config(&config, credential))
    }
}
