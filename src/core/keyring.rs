use keyring::Entry;
use std::error::Error;
use std::fmt;
use tracing::debug;

const KEYRING_SERVICE: &str = "deekseep";
const KEYRING_USER: &str = "api-key";

/// Describes failures when attempting to access the system keyring.
///
/// Recoverable errors mean the backend was temporarily unavailable (a locked
/// keychain, no secret service running). Permanent errors surface the cause
/// directly so callers can report them.
#[derive(Debug)]
pub enum KeyringAccessError {
    Recoverable(keyring::Error),
    Permanent(keyring::Error),
}

impl KeyringAccessError {
    fn inner(&self) -> &keyring::Error {
        match self {
            KeyringAccessError::Recoverable(err) | KeyringAccessError::Permanent(err) => err,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, KeyringAccessError::Recoverable(_))
    }
}

impl From<keyring::Error> for KeyringAccessError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                KeyringAccessError::Recoverable(err)
            }
            other => KeyringAccessError::Permanent(other),
        }
    }
}

impl fmt::Display for KeyringAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner())
    }
}

impl Error for KeyringAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner())
    }
}

/// The credential override kept in the platform keyring.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore;

impl CredentialStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(&self) -> Result<Entry, KeyringAccessError> {
        Ok(Entry::new(KEYRING_SERVICE, KEYRING_USER)?)
    }

    pub fn store(&self, api_key: &str) -> Result<(), KeyringAccessError> {
        self.entry()?.set_password(api_key)?;
        Ok(())
    }

    /// `Ok(None)` when no key has been stored.
    pub fn load(&self) -> Result<Option<String>, KeyringAccessError> {
        match self.entry()?.get_password() {
            Ok(token) => {
                debug!("keyring lookup result=present");
                Ok(Some(token))
            }
            Err(keyring::Error::NoEntry) => {
                debug!("keyring lookup result=missing");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Removing a key that was never stored is not an error.
    pub fn remove(&self) -> Result<(), KeyringAccessError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
