//! The in-memory ledger used by the `memory_server` binary.

use std::collections::HashMap;

use time::Date;

use crate::{Error, database_id::DatabaseID};

use super::{
    core::{Transaction, normalized_reason, validated_amount},
    split::split_share,
};

/// An append-only ledger held in process memory, with running totals that are
/// updated in the same call that appends a transaction.
///
/// The server wraps one of these in a mutex, so every request sees the
/// transactions and the totals at a single consistent point: the summaries
/// can never lag behind the list they summarise.
///
/// Users are registered implicitly by their first transaction and are listed
/// in first-seen order.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    transactions: Vec<Transaction>,
    users: Vec<String>,
    total: f64,
    daily_totals: HashMap<Date, f64>,
    user_totals: HashMap<String, f64>,
    user_daily_totals: HashMap<String, HashMap<Date, f64>>,
    next_id: DatabaseID,
}

impl MemoryLedger {
    /// Create a new, empty ledger.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Record an expense for `username`, registering the user if this is the
    /// first time the name has been seen.
    ///
    /// # Errors
    ///
    /// Returns [Error::MalformedInput] if `username` is blank or `amount` is
    /// not a finite number. The ledger is unchanged on error.
    pub fn add_transaction(
        &mut self,
        username: &str,
        date: Date,
        amount: f64,
        reason: Option<&str>,
    ) -> Result<Transaction, Error> {
        let username = validated_username(username)?;
        let amount = validated_amount(amount)?;

        let transaction = Transaction {
            id: self.next_id,
            username: username.clone(),
            date,
            amount,
            reason: normalized_reason(reason),
        };
        self.next_id += 1;

        if !self.users.contains(&username) {
            self.users.push(username.clone());
        }

        self.total += amount;
        *self.daily_totals.entry(date).or_insert(0.0) += amount;
        *self.user_totals.entry(username.clone()).or_insert(0.0) += amount;
        *self
            .user_daily_totals
            .entry(username)
            .or_default()
            .entry(date)
            .or_insert(0.0) += amount;

        self.transactions.push(transaction.clone());

        Ok(transaction)
    }

    /// Split `amount` evenly between `participants`, recording one
    /// transaction of `amount / participants.len()` per participant.
    ///
    /// # Errors
    ///
    /// Returns a:
    /// - [Error::NoParticipants] if `participants` is empty,
    /// - or [Error::MalformedInput] if `amount` is not finite or any
    ///   participant name is blank.
    ///
    /// The ledger is unchanged on error: every name is validated before the
    /// first share is recorded.
    pub fn split_expense(
        &mut self,
        amount: f64,
        date: Date,
        reason: Option<&str>,
        participants: &[String],
    ) -> Result<Vec<Transaction>, Error> {
        if participants.is_empty() {
            return Err(Error::NoParticipants);
        }

        let amount = validated_amount(amount)?;
        let participants = participants
            .iter()
            .map(|username| validated_username(username))
            .collect::<Result<Vec<String>, Error>>()?;

        let share = split_share(amount, participants.len());

        participants
            .iter()
            .map(|username| self.add_transaction(username, date, share, reason))
            .collect()
    }

    /// Every transaction in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The transactions recorded for `username`, in insertion order.
    ///
    /// An unknown `username` yields an empty list.
    pub fn transactions_for_user(&self, username: &str) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|transaction| transaction.username == username)
            .cloned()
            .collect()
    }

    /// The usernames seen so far, in first-seen order.
    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// The sum of all transaction amounts.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// The total spent for `username`, zero for unknown names.
    pub fn total_for_user(&self, username: &str) -> f64 {
        self.user_totals.get(username).copied().unwrap_or(0.0)
    }

    /// The transaction amounts summed by calendar date, across all users.
    pub fn daily_totals(&self) -> &HashMap<Date, f64> {
        &self.daily_totals
    }

    /// The transaction amounts summed by calendar date for `username`.
    pub fn daily_totals_for_user(&self, username: &str) -> HashMap<Date, f64> {
        self.user_daily_totals
            .get(username)
            .cloned()
            .unwrap_or_default()
    }

    /// The total spent per user, in the same order as [MemoryLedger::users].
    pub fn totals_by_user(&self) -> Vec<(String, f64)> {
        self.users
            .iter()
            .map(|username| (username.clone(), self.total_for_user(username)))
            .collect()
    }
}

fn validated_username(username: &str) -> Result<String, Error> {
    let username = username.trim();

    if username.is_empty() {
        Err(Error::MalformedInput("user must not be blank".to_owned()))
    } else {
        Ok(username.to_owned())
    }
}
