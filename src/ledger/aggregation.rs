//! Pure functions for summarising transactions.
//!
//! These operate on slices so the SQLite-backed server can recompute
//! summaries from query results on each page load. The in-memory server
//! maintains the same figures incrementally and only uses these functions in
//! tests to check that its running totals agree with a full recompute.

use std::collections::HashMap;

use time::Date;

use super::core::Transaction;

/// Sum the amount of every transaction.
pub fn total_amount(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .map(|transaction| transaction.amount)
        .sum()
}

/// Sum the transaction amounts by calendar date.
pub fn daily_totals(transactions: &[Transaction]) -> HashMap<Date, f64> {
    let mut totals = HashMap::new();

    for transaction in transactions {
        *totals.entry(transaction.date).or_insert(0.0) += transaction.amount;
    }

    totals
}

/// Sum the transaction amounts by user.
///
/// Users listed in `known_users` appear in the result even if they have no
/// transactions, with a total of zero.
pub fn per_user_totals(transactions: &[Transaction], known_users: &[String]) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = known_users
        .iter()
        .map(|username| (username.clone(), 0.0))
        .collect();

    for transaction in transactions {
        *totals.entry(transaction.username.clone()).or_insert(0.0) += transaction.amount;
    }

    totals
}

/// Get the dates of `daily_totals` in ascending order for display.
pub fn sorted_dates(daily_totals: &HashMap<Date, f64>) -> Vec<Date> {
    let mut dates: Vec<Date> = daily_totals.keys().copied().collect();
    dates.sort();

    dates
}
