use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::Bytes;
use rand::Rng;
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::config::Config;

/// Usernames are identified by their normalized form: trimmed and lowercased.
/// Applied before every lookup, create, or comparison.
pub fn sanitize_user(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap()
}

/// Randomized delay standing in for the network and database round-trip a
/// managed deployment would pay. Runs before every handler and is never
/// cancelled once started.
pub async fn simulate_latency(config: &Config) {
    let jitter = if config.latency_jitter_ms == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..config.latency_jitter_ms)
    };
    let wait = config.latency_floor_ms + jitter;
    if wait > 0 {
        sleep(Duration::from_millis(wait)).await;
    }
}

/// Lenient body decode: absent or malformed JSON collapses to the type's
/// default instead of a parse error, so a broken body is handled exactly like
/// a missing one.
pub fn parse_body<T>(bytes: &Bytes) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_slice(bytes).unwrap_or_default()
}
