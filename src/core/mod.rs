pub mod completion;
pub mod config;
pub mod constants;
pub mod keyring;
pub mod message;
pub mod models;
pub mod transcript;
pub mod turn;
