use clap::Subcommand;
use tcgwatch_core::config::WatchConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Initialize ~/.tcgwatch/ with a default config and database
    Init,
    /// Show current configuration
    Show,
}

pub fn run(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let home = WatchConfig::init()?;
            let config = WatchConfig::load()?;
            let db_path = config.db_path()?;

            // Create the database with its schema
            tcgwatch_db::open_db(&db_path)?;

            println!("Initialized tcgwatch at {}", home.display());
            println!("  config: {}", WatchConfig::config_path()?.display());
            println!("  database: {}", db_path.display());
            Ok(())
        }
        ConfigAction::Show => {
            let mut config = WatchConfig::load()?;
            if config.api.private_key.is_some() {
                config.api.private_key = Some("********".to_string());
            }
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{toml_str}");
            Ok(())
        }
    }
}
