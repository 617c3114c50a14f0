use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    /// Fixed floor of the simulated round-trip, in milliseconds.
    pub latency_floor_ms: u64,
    /// Random extra delay in `0..jitter` added on top of the floor.
    pub latency_jitter_ms: u64,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("BM_PORT", "8080"),
            latency_floor_ms: try_load("BM_LATENCY_FLOOR_MS", "350"),
            latency_jitter_ms: try_load("BM_LATENCY_JITTER_MS", "400"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
