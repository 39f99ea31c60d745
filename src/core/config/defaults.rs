use std::time::Duration;

use crate::core::config::data::Config;
use crate::core::constants::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL_LABEL, DEFAULT_SYSTEM_PROMPT,
    DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS, MAX_TEMPERATURE,
};
use crate::ui::render::RenderOptions;

impl Config {
    pub fn model_label(&self) -> &str {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(DEFAULT_MODEL_LABEL)
    }

    /// Unset, non-positive or non-finite values fall back to the default;
    /// anything above the maximum is clamped.
    pub fn effective_temperature(&self) -> f64 {
        match self.temperature {
            Some(value) if value.is_finite() && value > 0.0 => value.min(MAX_TEMPERATURE),
            _ => DEFAULT_TEMPERATURE,
        }
    }

    pub fn effective_max_tokens(&self) -> u32 {
        match self.max_tokens {
            Some(value) if value > 0 => u32::try_from(value).unwrap_or(u32::MAX),
            _ => DEFAULT_MAX_TOKENS,
        }
    }

    /// `None` when the prompt has been explicitly set to an empty string.
    pub fn effective_system_prompt(&self) -> Option<&str> {
        match self.system_prompt.as_deref() {
            Some(prompt) if prompt.trim().is_empty() => None,
            Some(prompt) => Some(prompt),
            None => Some(DEFAULT_SYSTEM_PROMPT),
        }
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn effective_timeout(&self) -> Duration {
        let secs = match self.timeout_secs {
            Some(secs) if secs > 0 => secs,
            _ => DEFAULT_TIMEOUT_SECS,
        };
        Duration::from_secs(secs)
    }

    /// Non-blank credential override from the config file.
    pub fn api_key_override(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn render_options(&self) -> RenderOptions {
        let defaults = RenderOptions::default();
        RenderOptions {
            markdown: self.markdown.unwrap_or(defaults.markdown),
            render_math: self.render_math.unwrap_or(defaults.render_math),
        }
    }
}
