use tcgwatch_core::config::ApiConfig;
use tcgwatch_core::error::WatchError;

/// Trait for credential storage backends.
pub trait CredentialStore: Send + Sync {
    /// Store a secret under the given key.
    fn store(&self, key: &str, secret: &str) -> Result<(), WatchError>;

    /// Retrieve a secret by key.
    fn get(&self, key: &str) -> Result<Option<String>, WatchError>;

    /// Delete a stored secret.
    fn delete(&self, key: &str) -> Result<(), WatchError>;
}

/// Keychain entry under which the private key for `public_key` is kept.
pub fn private_key_entry(public_key: &str) -> String {
    format!("tcgwatch:{public_key}")
}

/// Private key from the config file, falling back to the credential store.
pub fn resolve_private_key(
    api: &ApiConfig,
    store: &dyn CredentialStore,
) -> Result<String, WatchError> {
    if let Some(key) = api.private_key.as_deref().filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    if api.public_key.is_empty() {
        return Err(WatchError::Config {
            message: "api.public_key is not set".into(),
        });
    }

    tracing::debug!(public_key = %api.public_key, "reading private key from keychain");
    store
        .get(&private_key_entry(&api.public_key))?
        .ok_or_else(|| WatchError::CredentialError {
            message: format!(
                "no private key for '{}' in config or keychain",
                api.public_key
            ),
        })
}

/// OS keychain-backed credential store using the `keyring` crate.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: "tcgwatch".to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, WatchError> {
        keyring::Entry::new(&self.service, key).map_err(|e| WatchError::CredentialError {
            message: e.to_string(),
        })
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringStore {
    fn store(&self, key: &str, secret: &str) -> Result<(), WatchError> {
        self.entry(key)?
            .set_password(secret)
            .map_err(|e| WatchError::CredentialError {
                message: e.to_string(),
            })
    }

    fn get(&self, key: &str) -> Result<Option<String>, WatchError> {
        match self.entry(key)?.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(WatchError::CredentialError {
                message: e.to_string(),
            }),
        }
    }

    fn delete(&self, key: &str) -> Result<(), WatchError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(WatchError::CredentialError {
                message: e.to_string(),
            }),
        }
    }
}

/// In-memory credential store for testing.
pub struct MemoryStore {
    store: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            store: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MemoryStore {
    fn store(&self, key: &str, secret: &str) -> Result<(), WatchError> {
        self.store
            .lock()
            .unwrap()
            .insert(key.to_string(), secret.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, WatchError> {
        Ok(self.store.lock().unwrap().get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), WatchError> {
        self.store.lock().unwrap().remove(key);
        Ok(())
    }
}
