//! A single user's expense history, served by the in-memory server only.
//!
//! The SQLite server has no per-user pages: everyone's figures are on the
//! dashboard and identity comes from the session.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    Error, MemoryAppState,
    dashboard::{daily_totals_table, transactions_table},
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base, format_currency},
    ledger::sorted_dates,
    navigation::NavBar,
};

/// Display the transactions, daily totals and total for one user.
///
/// A username that has never appeared in a transaction is not an error: the
/// page renders with no transactions and a total of zero.
pub async fn get_user_page(
    State(state): State<MemoryAppState>,
    Path(username): Path<String>,
) -> Result<Response, Error> {
    let ledger = state
        .ledger
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire ledger lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let transactions = ledger.transactions_for_user(&username);
    let total = ledger.total_for_user(&username);
    let daily_totals = ledger.daily_totals_for_user(&username);
    drop(ledger);

    let daily_rows: Vec<_> = sorted_dates(&daily_totals)
        .into_iter()
        .map(|date| (date, daily_totals[&date]))
        .collect();

    let nav_bar = NavBar::new_memory(endpoints::USER_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-screen-lg space-y-8"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { (username) }

                    p class="text-lg"
                    {
                        "Total spent: "
                        span class="font-semibold" { (format_currency(total)) }
                    }
                }

                @if transactions.is_empty() {
                    p { "No expenses recorded for this user." }
                } @else {
                    section
                    {
                        h2 class="text-lg font-semibold mb-4" { "Transactions" }
                        (transactions_table(&transactions))
                    }

                    section
                    {
                        h2 class="text-lg font-semibold mb-4" { "Daily Totals" }
                        (daily_totals_table(&daily_rows))
                    }
                }
            }
        }
    );

    Ok(base(&username, &content).into_response())
}
