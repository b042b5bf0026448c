//! Database initialisation.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, ledger::create_transaction_table, user::create_user_table};

/// Create the application tables in the database.
///
/// Foreign key enforcement is switched on for the connection, and the tables
/// are created inside a single exclusive transaction so that two servers
/// racing to initialise the same file cannot observe a half-built schema.
///
/// # Errors
///
/// This function will return an error if there was an SQL error creating the
/// tables.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
