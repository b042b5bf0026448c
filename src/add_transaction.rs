//! The route handlers for recording a single expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, MemoryAppState, endpoints,
    ledger::{create_transaction, normalized_reason, validated_amount},
    user::UserID,
};

/// The state needed to record a transaction in the database.
#[derive(Debug, Clone)]
pub struct AddTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AddTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for recording an expense on the SQLite-backed server.
///
/// There is no username field: the payer is whoever owns the session, taken
/// from the request extensions by way of the auth guard.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The value of the expense in dollars.
    pub amount: f64,
    /// The date when the expense occurred.
    pub date: Date,
    /// Optional text detailing what the expense was for.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Record an expense for the logged-in user, then redirect to the dashboard.
pub async fn post_add_transaction(
    State(state): State<AddTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let amount = match validated_amount(form.amount) {
        Ok(amount) => amount,
        Err(error) => return error.into_response(),
    };
    let reason = normalized_reason(form.reason.as_deref());

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    if let Err(error) = create_transaction(user_id, form.date, amount, reason.as_deref(), &connection)
    {
        return error.into_response();
    }

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// The form data for recording an expense on the in-memory server, which has
/// no sessions and so must ask who paid.
#[derive(Debug, Deserialize)]
pub struct MemoryTransactionForm {
    /// The name of the user who paid.
    pub user: String,
    /// The value of the expense in dollars.
    pub amount: f64,
    /// The date when the expense occurred.
    pub date: Date,
    /// Optional text detailing what the expense was for.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Record an expense in the in-memory ledger, registering the payer if they
/// have not been seen before, then redirect to the dashboard.
pub async fn post_memory_add_transaction(
    State(state): State<MemoryAppState>,
    Form(form): Form<MemoryTransactionForm>,
) -> Response {
    let mut ledger = match state.ledger.lock() {
        Ok(ledger) => ledger,
        Err(error) => {
            tracing::error!("could not acquire ledger lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    if let Err(error) =
        ledger.add_transaction(&form.user, form.date, form.amount, form.reason.as_deref())
    {
        return error.into_response();
    }

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
