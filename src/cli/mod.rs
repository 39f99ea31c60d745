//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod auth;
pub mod chat;
pub mod say;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::cli::auth::{run_auth, run_deauth};
use crate::cli::chat::run_chat;
use crate::cli::say::run_say;
use crate::core::completion::{CompletionClient, HttpTransport};
use crate::core::config::printing::CONFIG_KEYS;
use crate::core::config::{Config, FileSettings};
use crate::core::keyring::CredentialStore;
use crate::core::models::builtin_models;
use crate::core::turn::TurnController;
use crate::utils::logging::{init_tracing, TranscriptLog};

#[derive(Parser)]
#[command(name = "deekseep")]
#[command(about = "A terminal chat client for the DeepSeek API with LaTeX-aware rendering")]
#[command(
    long_about = "Deekseep sends your prompts to the DeepSeek chat-completion API and prints \
the replies, pulling $inline$ and $$display$$ math out of the text so it can be shown \
apart from the prose.\n\n\
Authentication:\n\
  Use 'deekseep auth' to store an API key in your system keyring, or set api-key with \
'deekseep set api-key <key>'.\n\n\
Environment Variables:\n\
  DEEPSEEK_API_KEY  Built-in API key used when no key is configured\n\
  DEEKSEEP_LOG      Log filter for diagnostics (e.g. 'deekseep=debug')\n\n\
Chat commands:\n\
  /quit, /exit      Leave the chat\n\
  Ctrl+C            Abandon the pending request and quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model label to use for this session (see 'deekseep models')
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Append the conversation to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Use a different configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print debug diagnostics to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat (default)
    Chat,
    /// Send a single prompt and print the reply
    Say {
        /// Prompt text (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Set a configuration value, or print the configuration if no value is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key (can be multiple words for system-prompt)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// List the available model labels
    Models,
    /// Store an API key in the system keyring
    Auth,
    /// Remove the API key from the system keyring
    Deauth,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async_main());
    // A pending stdin read would otherwise keep shutdown waiting.
    runtime.shutdown_background();
    result
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let mut args = Args::parse();
    init_tracing(args.verbose);
    let command = args.command.take().unwrap_or(Commands::Chat);

    let config_path = match args.config.clone() {
        Some(path) => path,
        None => Config::default_config_path()?,
    };

    match command {
        Commands::Set { key, value } => {
            let mut config = Config::load_from_path(&config_path)?;
            match key {
                Some(key) if !value.is_empty() => {
                    let value = value.join(" ");
                    if let Err(message) = config.set_value(&key, &value) {
                        eprintln!("❌ {message}");
                        eprintln!("Known keys: {}", CONFIG_KEYS.join(", "));
                        std::process::exit(1);
                    }
                    config.save_to_path(&config_path)?;
                    println!("✅ Set {key}");
                }
                _ => config.print_all(),
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load_from_path(&config_path)?;
            if let Err(message) = config.unset_value(&key) {
                eprintln!("❌ {message}");
                eprintln!("Known keys: {}", CONFIG_KEYS.join(", "));
                std::process::exit(1);
            }
            config.save_to_path(&config_path)?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Models => {
            let config = Config::load_from_path(&config_path)?;
            let current = args.model.as_deref().unwrap_or(config.model_label());
            for model in builtin_models() {
                let marker = if model.label.eq_ignore_ascii_case(current) {
                    "*"
                } else {
                    " "
                };
                let description = model.description.as_deref().unwrap_or("");
                println!("{marker} {:<14} {:<16} {description}", model.label, model.api_id);
            }
            Ok(())
        }
        Commands::Auth => run_auth(&CredentialStore::new()),
        Commands::Deauth => run_deauth(&CredentialStore::new()),
        Commands::Chat => {
            let config = Config::load_from_path(&config_path)?;
            let controller = build_controller(&args, &config, config_path);
            let log = open_log(args.log.as_ref())?;
            run_chat(controller, config.render_options(), log).await
        }
        Commands::Say { prompt } => {
            let prompt = prompt.join(" ");
            let config = Config::load_from_path(&config_path)?;
            let controller = build_controller(&args, &config, config_path);
            let log = open_log(args.log.as_ref())?;
            run_say(controller, &prompt, config.render_options(), log).await
        }
    }
}

fn build_controller(args: &Args, config: &Config, config_path: PathBuf) -> Arc<TurnController> {
    let client = CompletionClient::from_env(HttpTransport::new(config.effective_base_url()));
    let mut settings = FileSettings::new(config_path).with_keyring(CredentialStore::new());
    if let Some(model) = &args.model {
        settings = settings.with_model(model.clone());
    }
    Arc::new(TurnController::new(client, settings))
}

fn open_log(path: Option<&PathBuf>) -> Result<Option<TranscriptLog>, Box<dyn Error>> {
    match path {
        Some(path) => Ok(Some(TranscriptLog::open(path)?)),
        None => Ok(None),
    }
}
