//! Shared constants used across the application

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";

pub const COMPLETIONS_ENDPOINT: &str = "chat/completions";

/// Provider identifier used when a model label is not in the catalog.
pub const DEFAULT_API_MODEL: &str = "deepseek-chat";

pub const DEFAULT_MODEL_LABEL: &str = "DeekSeep-V3";

pub const DEFAULT_TEMPERATURE: f64 = 0.7;

pub const MAX_TEMPERATURE: f64 = 1.0;

pub const DEFAULT_MAX_TOKENS: u32 = 4000;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable holding the built-in credential.
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// Environment variable read by the tracing filter.
pub const LOG_ENV: &str = "DEEKSEEP_LOG";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Deekseep, a helpful AI assistant. Keep your responses friendly and relatively brief. IMPORTANT: When writing equations or mathematical expressions, always use display math format with $$...$$ delimiters instead of inline math ($...$). Ensure there are NO spaces between the $$ delimiters and the mathematical content itself (e.g., use $$\\frac{a}{b}$$ NOT $$ \\frac{a}{b} $$). Do not add a period after the latex equation. Leave a line after every equation display. Also, do not use inline math also include \\(...\\)";
