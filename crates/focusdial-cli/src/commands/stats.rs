use clap::Subcommand;
use focusdial_core::Config;

use super::open_database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's completed phases
    Today,
    /// All-time completed phases
    All,
    /// Most recent completed phases
    Recent {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

pub fn run(action: StatsAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database(config)?;

    match action {
        StatsAction::Today => {
            let stats = db.summary_today()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::All => {
            let stats = db.summary_all()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Recent { limit } => {
            let phases = db.recent_phases(limit)?;
            println!("{}", serde_json::to_string_pretty(&phases)?);
        }
    }
    Ok(())
}
