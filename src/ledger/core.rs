//! Defines the core transaction model, validation and database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::DatabaseID, user::UserID};

/// An expense recorded against a user.
///
/// Amounts are positive for money spent. The `username` comes from joining
/// the user table, so a `Transaction` can be rendered without another lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseID,
    /// The name of the user who paid.
    pub username: String,
    /// When the expense happened.
    pub date: Date,
    /// The amount of money spent.
    pub amount: f64,
    /// An optional note of what the expense was for.
    pub reason: Option<String>,
}

/// Check that `amount` can be recorded in the ledger.
///
/// # Errors
///
/// Returns [Error::MalformedInput] if `amount` is NaN or infinite. Anything
/// that survives an HTML number input and a float parse can still be one of
/// those, e.g. the literal text "NaN".
pub fn validated_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(Error::MalformedInput(
            "amount must be a finite number".to_owned(),
        ))
    }
}

/// Trim `reason` and drop it entirely if nothing is left.
pub fn normalized_reason(reason: Option<&str>) -> Option<String> {
    reason
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .map(str::to_owned)
}

/// Create the transaction table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES user(id),
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                reason TEXT
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new transaction into the database and return its ID.
///
/// The caller is expected to have validated `amount` and normalised `reason`
/// already, e.g. with [validated_amount] and [normalized_reason].
///
/// # Errors
///
/// This function will return a:
/// - [Error::UnknownUser] if `user_id` does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    date: Date,
    amount: f64,
    reason: Option<&str>,
    connection: &Connection,
) -> Result<DatabaseID, Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, date, amount, reason)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id",
        )?
        .query_row((user_id.as_i64(), date, amount, reason), |row| row.get(0))
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::UnknownUser(user_id.to_string()),
            error => error.into(),
        })
}

/// Get every transaction in the database in insertion order.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT t.id, u.username, t.date, t.amount, t.reason
             FROM \"transaction\" t
             INNER JOIN user u ON t.user_id = u.id
             ORDER BY t.id ASC",
        )?
        .query_map([], map_transaction_row)?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        username: row.get(1)?,
        date: row.get(2)?,
        amount: row.get(3)?,
        reason: row.get(4)?,
    })
}
