use clap::Subcommand;
use focusdial_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value by dotted key
    Get {
        /// e.g. "engine.tick_period_ms", "storage.database_file", "log.filter"
        key: String,
    },
    /// Validate, change and save one value
    Set {
        /// Dotted key
        key: String,
        /// New value, parsed to the key's type
        value: String,
    },
    /// Print the whole file as TOML
    List,
    /// Print where config.toml lives
    Path,
    /// Overwrite config.toml with the defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            tracing::info!(%key, %value, "config updated");
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List => print!("{}", toml::to_string_pretty(&Config::load()?)?),
        ConfigAction::Path => println!("{}", Config::path()?.display()),
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("{} reset to defaults", Config::path()?.display());
        }
    }
    Ok(())
}
