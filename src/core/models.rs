//! Built-in model catalog
//!
//! The client shows friendly model labels; the API wants provider identifiers.
//! The mapping is embedded from `builtin_models.toml` at build time.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::warn;

use crate::core::constants::DEFAULT_API_MODEL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinModel {
    pub label: String,
    pub api_id: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BuiltinModelsConfig {
    models: Vec<BuiltinModel>,
}

static BUILTIN_MODELS: LazyLock<Vec<BuiltinModel>> = LazyLock::new(load_builtin_models);

fn load_builtin_models() -> Vec<BuiltinModel> {
    const CONFIG_CONTENT: &str = include_str!("../builtin_models.toml");

    match toml::from_str::<BuiltinModelsConfig>(CONFIG_CONTENT) {
        Ok(config) => config.models,
        Err(err) => {
            warn!("failed to parse builtin_models.toml: {err}");
            Vec::new()
        }
    }
}

pub fn builtin_models() -> &'static [BuiltinModel] {
    &BUILTIN_MODELS
}

/// Find a built-in model by label (case-insensitive)
pub fn find_builtin_model(label: &str) -> Option<&'static BuiltinModel> {
    builtin_models()
        .iter()
        .find(|model| model.label.eq_ignore_ascii_case(label))
}

/// Translate a UI label into the identifier sent to the API. Unknown labels
/// fall back to [`DEFAULT_API_MODEL`].
pub fn resolve_api_model(label: &str) -> &'static str {
    find_builtin_model(label)
        .map(|model| model.api_id.as_str())
        .unwrap_or(DEFAULT_API_MODEL)
}
