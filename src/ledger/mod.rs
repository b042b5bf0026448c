//! The expense ledger: the transaction model and SQLite queries, the
//! in-memory ledger with running totals, aggregation helpers and even
//! splitting.

mod aggregation;
mod core;
mod memory;
mod split;

pub use aggregation::{daily_totals, per_user_totals, sorted_dates, total_amount};
pub use core::{
    Transaction, create_transaction, create_transaction_table, get_all_transactions,
    normalized_reason, validated_amount,
};
pub use memory::MemoryLedger;
pub use split::split_expense;
