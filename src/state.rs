use std::sync::Arc;

use super::{config::Config, database::Db};

pub struct AppState {
    pub config: Config,
    pub db: Db,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        let config = Config::load();

        Arc::new(Self {
            config,
            db: Db::new(),
        })
    }

    /// State with an explicit config and a fresh empty store. Used by tests to
    /// zero out the simulated latency.
    pub fn with_config(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config,
            db: Db::new(),
        })
    }
}
