//! # Containers
//!
//! Three independent collections over the key-value substrate: users, votes,
//! and sessions. Each container owns exactly one storage key and is
//! materialized as a single JSON object mapping an entity id to its document,
//! persisted wholesale on every write.
//!
//! Referential integrity across containers (a vote's user must exist and be
//! authenticated) is enforced by the handlers, never down here.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    protocol::Choice,
    session::make_token,
    store::MemoryStore,
    tally::Tally,
    utils::now_ms,
};

pub const USERS_KEY: &str = "bm_users";
pub const VOTES_KEY: &str = "bm_votes";
pub const SESSIONS_KEY: &str = "bm_sessions";

/// User document. Created once by Register, never mutated or deleted. The
/// password is stored verbatim; hashing is out of scope here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub password: String,
    pub created_at: u64,
}

/// Session document, keyed by its opaque token in the sessions container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub username: String,
    pub ts: u64,
}

/// A freshly minted session, token included, as handed back to the caller.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub ts: u64,
}

type UserMap = HashMap<String, UserRecord>;
type VoteMap = HashMap<String, Choice>;
type SessionMap = HashMap<String, SessionRecord>;

#[derive(Clone)]
pub struct Db {
    store: Arc<MemoryStore>,
}

impl Db {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub fn users(&self) -> Users<'_> {
        Users { store: &self.store }
    }

    pub fn votes(&self) -> Votes<'_> {
        Votes { store: &self.store }
    }

    pub fn sessions(&self) -> Sessions<'_> {
        Sessions { store: &self.store }
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::new()
    }
}

/// Users container, id = normalized username.
pub struct Users<'a> {
    store: &'a MemoryStore,
}

impl Users<'_> {
    /// Lookup by already-normalized username. No side effects.
    pub fn get(&self, username: &str) -> Option<UserRecord> {
        let users: UserMap = self.store.load(USERS_KEY);
        users.get(username).cloned()
    }

    /// Create-if-absent, atomic at the substrate boundary: of two concurrent
    /// creates for one username, exactly one wins and the other gets
    /// `Conflict`.
    pub fn create(&self, username: &str, password: &str) -> Result<UserRecord, ApiError> {
        self.store.update(USERS_KEY, |users: &mut UserMap| {
            if users.contains_key(username) {
                return Err(ApiError::Conflict("Username already exists".to_owned()));
            }
            let record = UserRecord {
                password: password.to_owned(),
                created_at: now_ms(),
            };
            users.insert(username.to_owned(), record.clone());
            Ok(record)
        })
    }
}

/// Votes container, id = user id, one vote per user.
pub struct Votes<'a> {
    store: &'a MemoryStore,
}

impl Votes<'_> {
    /// Unconditional overwrite of any prior vote for `user_id`. Last write
    /// wins; votes are never deleted.
    pub fn upsert(&self, user_id: &str, choice: Choice) -> Choice {
        self.store.update(VOTES_KEY, |votes: &mut VoteMap| {
            votes.insert(user_id.to_owned(), choice);
        });
        choice
    }

    pub fn get_by_user(&self, user_id: &str) -> Option<Choice> {
        let votes: VoteMap = self.store.load(VOTES_KEY);
        votes.get(user_id).copied()
    }

    /// Full scan of the votes map, recomputed on every call, never cached.
    pub fn summary(&self) -> Tally {
        let votes: VoteMap = self.store.load(VOTES_KEY);
        Tally::from_votes(votes.values())
    }
}

/// Sessions container, keyed by token so one process can serve many callers
/// at once. Token presence is the only authentication check performed.
pub struct Sessions<'a> {
    store: &'a MemoryStore,
}

impl Sessions<'_> {
    pub fn get(&self, token: &str) -> Option<SessionRecord> {
        let sessions: SessionMap = self.store.load(SESSIONS_KEY);
        sessions.get(token).cloned()
    }

    /// Mint a fresh session for `username`. Register and Login both call this;
    /// older sessions for the same user stay valid until logged out.
    pub fn set(&self, username: &str) -> Session {
        let token = make_token();
        let record = SessionRecord {
            username: username.to_owned(),
            ts: now_ms(),
        };
        self.store.update(SESSIONS_KEY, |sessions: &mut SessionMap| {
            sessions.insert(token.clone(), record.clone());
        });
        Session {
            token,
            username: record.username,
            ts: record.ts,
        }
    }

    /// Remove the session entirely so a later `get` returns `None`. A no-op
    /// for unknown tokens, which keeps Logout idempotent.
    pub fn clear(&self, token: &str) {
        self.store.update(SESSIONS_KEY, |sessions: &mut SessionMap| {
            sessions.remove(token);
        });
    }
}
