pub mod config;
pub mod session;
pub mod settings;
pub mod stats;

use focusdial_core::{Config, Database};

/// Open the session database named in `config`.
pub fn open_database(config: &Config) -> Result<Database, Box<dyn std::error::Error>> {
    let path = config.database_path()?;
    Ok(Database::open(&path)?)
}
