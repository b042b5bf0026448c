//! Divvy is a web app for tracking shared expenses and splitting them evenly
//! across the people involved.
//!
//! This library provides a REST API that directly serves HTML pages. Two
//! server binaries are built from it: `server` (SQLite-backed with password
//! accounts) and `memory_server` (no accounts, state in process memory).

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_server::Handle;
use tokio::signal;

mod add_transaction;
mod app_state;
mod auth;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod forgot_password;
mod html;
mod ledger;
mod log_out;
mod logging;
mod navigation;
mod password;
mod routing;
mod sign_up;
mod split_page;
mod timezone;
mod user;
mod user_page;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, MemoryAppState};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::{build_memory_router, build_router};
pub use user::{User, UserID, create_user, get_user_by_name};

use crate::html::error_view;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an unknown username or a wrong password.
    ///
    /// The two causes are deliberately indistinguishable so that log-in
    /// attempts cannot be used to probe for registered usernames.
    #[error("incorrect username or password")]
    InvalidCredentials,

    /// A registration request used a username that is already taken.
    #[error("the username \"{0}\" is already taken")]
    DuplicateUser(String),

    /// A guarded route was requested without a valid session.
    #[error("not logged in")]
    NotAuthenticated,

    /// A split was requested with nobody selected to share the expense.
    #[error("select at least one person to split the expense with")]
    NoParticipants,

    /// A transaction referred to a user that is not registered.
    #[error("no registered user named \"{0}\"")]
    UnknownUser(String),

    /// The client sent a form value that could not be used, e.g. a
    /// non-finite amount or an empty username.
    #[error("invalid input: {0}")]
    MalformedInput(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Html(
                    error_view(
                        "Not Found",
                        "404",
                        "Page not found.",
                        "Check the address, or head back to the dashboard.",
                    )
                    .into_string(),
                ),
            )
                .into_response(),
            Error::NotAuthenticated => Redirect::to(endpoints::LOG_IN_VIEW).into_response(),
            Error::NoParticipants
            | Error::UnknownUser(_)
            | Error::MalformedInput(_)
            | Error::TooWeak(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(
                    error_view(
                        "Invalid Input",
                        "422",
                        "That submission could not be processed.",
                        &self.to_string(),
                    )
                    .into_string(),
                ),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(
                        error_view(
                            "Internal Server Error",
                            "500",
                            "Sorry, something went wrong.",
                            "Try again later or check the server logs",
                        )
                        .into_string(),
                    ),
                )
                    .into_response()
            }
        }
    }
}
