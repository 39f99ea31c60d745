//! Deekseep is a terminal chat client for the DeepSeek chat-completion API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the transcript, configuration, credentials, the completion
//!   client, and the turn controller that serializes one request at a time.
//! - [`ui`] splits replies into prose and `$`/`$$` math segments and renders
//!   them for the terminal.
//! - [`api`] defines the chat-completion wire payloads.
//! - [`cli`] parses arguments and runs the interactive and one-shot commands.
//!
//! The binary (`src/main.rs`) routes straight into [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
