//! Splitting an expense evenly across users.

use rusqlite::Connection;
use time::Date;

use crate::{Error, database_id::DatabaseID, user::get_user_by_name};

use super::core::{create_transaction, normalized_reason, validated_amount};

/// The share each participant owes when `amount` is split `participant_count`
/// ways.
///
/// Shares are plain division: three people splitting $100 each owe
/// $33.333..., and the recorded shares sum back to the original amount only
/// up to floating point error. Display code rounds to cents.
pub fn split_share(amount: f64, participant_count: usize) -> f64 {
    amount / participant_count as f64
}

/// Split `amount` evenly between `participants`, recording one transaction of
/// [split_share] per participant in the database.
///
/// All inserts happen inside a single SQL transaction. The first unknown
/// participant aborts the whole split and rolls back, so either every
/// participant gets their share or nothing is recorded.
///
/// Returns the IDs of the recorded transactions, in `participants` order.
///
/// # Errors
///
/// This function will return a:
/// - [Error::NoParticipants] if `participants` is empty,
/// - [Error::MalformedInput] if `amount` is not a finite number,
/// - [Error::UnknownUser] if any participant is not a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn split_expense(
    amount: f64,
    date: Date,
    reason: Option<&str>,
    participants: &[String],
    connection: &mut Connection,
) -> Result<Vec<DatabaseID>, Error> {
    if participants.is_empty() {
        return Err(Error::NoParticipants);
    }

    let amount = validated_amount(amount)?;
    let share = split_share(amount, participants.len());
    let reason = normalized_reason(reason);

    let sql_transaction = connection.transaction()?;
    let mut transaction_ids = Vec::with_capacity(participants.len());

    for username in participants {
        let user = get_user_by_name(username, &sql_transaction).map_err(|error| match error {
            Error::NotFound => Error::UnknownUser(username.clone()),
            error => error,
        })?;

        let transaction_id =
            create_transaction(user.id, date, share, reason.as_deref(), &sql_transaction)?;
        transaction_ids.push(transaction_id);
    }

    sql_transaction.commit()?;

    Ok(transaction_ids)
}
