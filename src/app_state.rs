//! Implements the structs that hold the state of the two server variants.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error, auth::cookie::DEFAULT_COOKIE_DURATION, db::initialize, ledger::MemoryLedger,
};

/// The state of the SQLite-backed server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    /// If `cookie_secret` is `None` a random key is generated, which means
    /// sessions will not survive a server restart.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: Option<&str>,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let cookie_key = match cookie_secret {
            Some(secret) => create_cookie_key(secret),
            None => Key::generate(),
        };

        Ok(Self {
            cookie_key,
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret` string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

/// The state of the in-memory server.
///
/// Everything lives behind one mutex: reads and writes both take the lock, so
/// each request observes the ledger and its running totals at a single
/// consistent point in time.
#[derive(Debug, Clone)]
pub struct MemoryAppState {
    /// The shared ledger holding transactions and their running totals.
    pub ledger: Arc<Mutex<MemoryLedger>>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl MemoryAppState {
    /// Create a new, empty [MemoryAppState].
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    pub fn new(local_timezone: &str) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(MemoryLedger::new())),
            local_timezone: local_timezone.to_owned(),
        }
    }
}
