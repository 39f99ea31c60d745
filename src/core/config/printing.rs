use crate::core::config::data::Config;

/// Keys accepted by `set` / `unset`.
pub const CONFIG_KEYS: &[&str] = &[
    "api-key",
    "model",
    "temperature",
    "max-tokens",
    "system-prompt",
    "base-url",
    "timeout",
    "markdown",
    "render-math",
];

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(format!("Expected on/off, got '{value}'")),
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let visible: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("****{visible}")
}

impl Config {
    /// Apply `key = value` from the command line.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        match key {
            "api-key" => self.api_key = Some(value.to_string()),
            "model" => self.model = Some(value.to_string()),
            "temperature" => {
                let parsed: f64 = value
                    .parse()
                    .map_err(|_| format!("Invalid temperature '{value}'"))?;
                if !(0.0..=1.0).contains(&parsed) {
                    return Err("Temperature must be between 0.0 and 1.0".to_string());
                }
                self.temperature = Some(parsed);
            }
            "max-tokens" => {
                let parsed: i64 = value
                    .parse()
                    .map_err(|_| format!("Invalid max-tokens '{value}'"))?;
                if parsed <= 0 {
                    return Err("max-tokens must be a positive integer".to_string());
                }
                self.max_tokens = Some(parsed);
            }
            "system-prompt" => self.system_prompt = Some(value.to_string()),
            "base-url" => self.base_url = Some(value.to_string()),
            "timeout" => {
                let parsed: u64 = value
                    .parse()
                    .map_err(|_| format!("Invalid timeout '{value}'"))?;
                if parsed == 0 {
                    return Err("timeout must be at least one second".to_string());
                }
                self.timeout_secs = Some(parsed);
            }
            "markdown" => self.markdown = Some(parse_bool(value)?),
            "render-math" => self.render_math = Some(parse_bool(value)?),
            _ => return Err(format!("Unknown config key: {key}")),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), String> {
        match key {
            "api-key" => self.api_key = None,
            "model" => self.model = None,
            "temperature" => self.temperature = None,
            "max-tokens" => self.max_tokens = None,
            "system-prompt" => self.system_prompt = None,
            "base-url" => self.base_url = None,
            "timeout" => self.timeout_secs = None,
            "markdown" => self.markdown = None,
            "render-math" => self.render_math = None,
            _ => return Err(format!("Unknown config key: {key}")),
        }
        Ok(())
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        match self.api_key_override() {
            Some(key) => println!("  api-key: {}", mask_key(key)),
            None => println!("  api-key: (unset)"),
        }
        println!("  model: {}", self.model_label());
        println!("  temperature: {}", self.effective_temperature());
        println!("  max-tokens: {}", self.effective_max_tokens());
        match self.system_prompt.as_deref() {
            Some(prompt) if prompt.trim().is_empty() => println!("  system-prompt: (disabled)"),
            Some(prompt) => println!("  system-prompt: {prompt}"),
            None => println!("  system-prompt: (built-in)"),
        }
        println!("  base-url: {}", self.effective_base_url());
        println!("  timeout: {}s", self.effective_timeout().as_secs());
        let render = self.render_options();
        println!("  markdown: {}", if render.markdown { "on" } else { "off" });
        println!(
            "  render-math: {}",
            if render.render_math { "on" } else { "off" }
        );
    }
}
