//! Keyring credential setup

use std::error::Error;
use std::io::{self, BufRead, Write};

use crate::core::keyring::CredentialStore;

pub fn run_auth(store: &CredentialStore) -> Result<(), Box<dyn Error>> {
    print!("Enter your DeepSeek API key: ");
    io::stdout().flush()?;

    let mut key = String::new();
    io::stdin().lock().read_line(&mut key)?;
    let key = key.trim();
    if key.is_empty() {
        eprintln!("❌ API key is required");
        std::process::exit(1);
    }

    if let Err(err) = store.store(key) {
        eprintln!("❌ Could not save the API key: {err}");
        if err.is_recoverable() {
            eprintln!("💡 Unlock your system keyring, or use 'deekseep set api-key <key>'.");
        }
        std::process::exit(1);
    }
    println!("✅ API key saved to the system keyring");
    Ok(())
}

pub fn run_deauth(store: &CredentialStore) -> Result<(), Box<dyn Error>> {
    store.remove()?;
    println!("✅ API key removed from the system keyring");
    Ok(())
}
