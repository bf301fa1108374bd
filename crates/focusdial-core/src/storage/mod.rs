mod config;
pub mod database;
pub mod prefs;

pub use config::{Config, EngineConfig, LogConfig, StorageConfig};
pub use database::{Database, HistorySummary, PhaseRecord};
pub use prefs::{keys, MemoryStore, PrefValue, PreferenceStore};

use std::path::PathBuf;

/// Returns the data directory.
///
/// `FOCUSDIAL_DATA_DIR` wins when set; otherwise `~/.config/focusdial[-dev]/`
/// based on `FOCUSDIAL_ENV` (set it to `dev` for a development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("FOCUSDIAL_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSDIAL_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusdial-dev")
            } else {
                base_dir.join("focusdial")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
