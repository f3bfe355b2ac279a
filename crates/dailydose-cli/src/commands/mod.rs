pub mod config;
pub mod history;
pub mod intake;
pub mod reset;
pub mod settings;

use std::path::PathBuf;

use dailydose_core::{Config, Database, LogNotifier, Tracker};

/// Shared state for commands that touch the tracker.
pub struct Context {
    pub config: Config,
    db_override: Option<PathBuf>,
}

impl Context {
    pub fn new(config: Config, db_override: Option<PathBuf>) -> Self {
        Self {
            config,
            db_override,
        }
    }

    /// Open the tracker on the configured database.
    pub fn tracker(&self) -> Result<Tracker<Database, LogNotifier>, Box<dyn std::error::Error>> {
        let path = match &self.db_override {
            Some(path) => path.clone(),
            None => self.config.database_path()?,
        };
        tracing::debug!(path = %path.display(), "opening tracker");
        let db = Database::open_at(&path)?;
        Ok(Tracker::new(db, LogNotifier)
            .with_taken_title(self.config.notifications.taken_title.clone()))
    }
}
