use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings persisted in `config.toml`. Every field is optional; the effective
/// values (with defaults applied) live in `defaults.rs`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Credential override. Takes precedence over the keyring and the
    /// built-in default.
    pub api_key: Option<String>,
    /// Model label as shown in the client (e.g., "DeekSeep-V3")
    pub model: Option<String>,
    pub temperature: Option<f64>,
    /// Signed so a hand-edited non-positive value falls back to the default
    /// instead of failing to parse.
    pub max_tokens: Option<i64>,
    /// System prompt prepended to every request. An empty string disables it.
    pub system_prompt: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Render text segments as Markdown
    pub markdown: Option<bool>,
    /// Split math out of Markdown replies before rendering
    pub render_math: Option<bool>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
