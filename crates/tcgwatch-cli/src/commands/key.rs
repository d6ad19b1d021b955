use clap::Subcommand;
use tcgwatch_auth::{private_key_entry, CredentialStore, KeyringStore};
use tcgwatch_core::config::WatchConfig;

#[derive(Subcommand)]
pub enum KeyAction {
    /// Store the private key in the OS keychain
    Set {
        /// Public key; saved to the config file when given
        #[arg(long)]
        public_key: Option<String>,
        /// Private key (will prompt if not provided)
        #[arg(long)]
        private_key: Option<String>,
    },
    /// Remove the private key from the OS keychain
    Delete,
}

pub fn run(action: KeyAction) -> anyhow::Result<()> {
    match action {
        KeyAction::Set {
            public_key,
            private_key,
        } => {
            let mut config = WatchConfig::load()?;
            if let Some(public_key) = public_key {
                config.api.public_key = public_key;
                config.save_to(&WatchConfig::config_path()?)?;
            }
            if config.api.public_key.is_empty() {
                anyhow::bail!("No public key configured. Pass --public-key");
            }

            let private_key = match private_key {
                Some(k) => k,
                None => {
                    eprint!("Enter private key for {}: ", config.api.public_key);
                    let mut input = String::new();
                    std::io::stdin().read_line(&mut input)?;
                    input.trim().to_string()
                }
            };
            if private_key.is_empty() {
                anyhow::bail!("Private key cannot be empty");
            }

            let entry = private_key_entry(&config.api.public_key);
            KeyringStore::new().store(&entry, &private_key)?;
            println!("Private key stored in OS keychain as '{entry}'");
            if config.api.private_key.is_some() {
                println!("Note: api.private_key in the config file takes precedence");
            }
            Ok(())
        }
        KeyAction::Delete => {
            let config = WatchConfig::load()?;
            if config.api.public_key.is_empty() {
                anyhow::bail!("No public key configured");
            }
            let entry = private_key_entry(&config.api.public_key);
            KeyringStore::new().delete(&entry)?;
            println!("Removed '{entry}' from OS keychain");
            Ok(())
        }
    }
}
