use rand::Rng;

use crate::database::Db;
use crate::utils::{now_ms, to_base36};

/// Mint an opaque session token: a random base36 tail plus the current
/// timestamp in base36. Uniqueness is advisory, not cryptographic; hardening
/// this into a real credential is out of scope.
pub fn make_token() -> String {
    let noise: u64 = rand::thread_rng().gen();
    format!("{}{}", to_base36(noise), to_base36(now_ms()))
}

/// Resolve the caller behind `token`, if any. Presence of the session is the
/// only check; the token is never validated against a credential store.
pub fn current_user(db: &Db, token: Option<&str>) -> Option<String> {
    let token = token?;
    db.sessions().get(token).map(|session| session.username)
}
