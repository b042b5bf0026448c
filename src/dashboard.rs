//! The dashboard: every transaction, the running totals and the inline
//! add-expense form.
//!
//! Both server variants render the same page from the same view functions;
//! they differ only in where the figures come from and in two details of the
//! add form (the in-memory server asks who paid, the SQLite server takes the
//! identity from the session).

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use time::{Date, OffsetDateTime};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error, MemoryAppState, endpoints,
    endpoints::format_endpoint,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    ledger::{
        Transaction, daily_totals, get_all_transactions, per_user_totals, sorted_dates,
        total_amount,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    user::get_all_usernames,
};

/// The max number of graphemes of reason text to display in table rows before
/// truncating and displaying ellipses.
const MAX_REASON_GRAPHEMES: usize = 32;

/// The state needed for displaying the dashboard page of the SQLite-backed
/// server.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// What the dashboard view should render for the server variant serving it.
#[derive(Debug, Clone, Copy)]
struct DashboardViewOptions {
    /// Ask who paid in the add form. The SQLite server knows from the
    /// session, the in-memory server has to ask.
    username_field: bool,
    /// Link each username in the totals table to its per-user page.
    link_user_pages: bool,
}

/// Display the dashboard with figures recomputed from the database.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone)?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let transactions = get_all_transactions(&connection)?;
    let usernames = get_all_usernames(&connection)?;
    drop(connection);

    let total = total_amount(&transactions);
    let daily_rows = sorted_daily_rows(&daily_totals(&transactions));
    let user_rows = sorted_user_rows(per_user_totals(&transactions, &usernames).into_iter());

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);
    let options = DashboardViewOptions {
        username_field: false,
        link_user_pages: false,
    };

    Ok(
        dashboard_view(nav_bar, &transactions, total, &daily_rows, &user_rows, today, options)
            .into_response(),
    )
}

/// Display the dashboard with figures served from the in-memory ledger's
/// running totals.
pub async fn get_memory_dashboard_page(
    State(state): State<MemoryAppState>,
) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone)?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let ledger = state
        .ledger
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire ledger lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let transactions = ledger.transactions().to_vec();
    let total = ledger.total();
    let daily_rows = sorted_daily_rows(ledger.daily_totals());
    let user_rows = sorted_user_rows(ledger.totals_by_user().into_iter());
    drop(ledger);

    let nav_bar = NavBar::new_memory(endpoints::DASHBOARD_VIEW);
    let options = DashboardViewOptions {
        username_field: true,
        link_user_pages: true,
    };

    Ok(
        dashboard_view(nav_bar, &transactions, total, &daily_rows, &user_rows, today, options)
            .into_response(),
    )
}

fn sorted_daily_rows(daily_totals: &std::collections::HashMap<Date, f64>) -> Vec<(Date, f64)> {
    sorted_dates(daily_totals)
        .into_iter()
        .map(|date| (date, daily_totals[&date]))
        .collect()
}

fn sorted_user_rows(user_totals: impl Iterator<Item = (String, f64)>) -> Vec<(String, f64)> {
    let mut rows: Vec<(String, f64)> = user_totals.collect();
    rows.sort_by(|(left, _), (right, _)| left.cmp(right));

    rows
}

fn dashboard_view(
    nav_bar: NavBar,
    transactions: &[Transaction],
    total: f64,
    daily_rows: &[(Date, f64)],
    user_rows: &[(String, f64)],
    today: Date,
    options: DashboardViewOptions,
) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-screen-lg space-y-8"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Dashboard" }

                    p class="text-lg"
                    {
                        "Total spent: "
                        span class="font-semibold" { (format_currency(total)) }
                    }
                }

                section
                {
                    h2 class="text-lg font-semibold mb-4" { "Add an expense" }
                    (add_transaction_form(today, options.username_field))
                }

                @if transactions.is_empty() {
                    p { "Nothing here yet. Add an expense above to get started." }
                } @else {
                    section
                    {
                        h2 class="text-lg font-semibold mb-4" { "Transactions" }
                        (transactions_table(transactions))
                    }

                    section
                    {
                        h2 class="text-lg font-semibold mb-4" { "Daily Totals" }
                        (daily_totals_table(daily_rows))
                    }
                }

                @if !user_rows.is_empty() {
                    section
                    {
                        h2 class="text-lg font-semibold mb-4" { "Totals by User" }
                        (per_user_table(user_rows, options.link_user_pages))
                    }
                }
            }
        }
    );

    base("Dashboard", &content)
}

/// The inline form for recording a single expense.
///
/// Posts to the add-transaction route via htmx; the handler answers with an
/// `HX-Redirect` back to the dashboard. Negative amounts are allowed, they
/// record refunds.
pub(crate) fn add_transaction_form(today: Date, with_username_field: bool) -> Markup {
    html! {
        form
            hx-post=(endpoints::ADD_TRANSACTION)
            class="space-y-4 bg-gray-50 dark:bg-gray-800 p-4 rounded-lg"
        {
            @if with_username_field {
                div
                {
                    label for="user" class=(FORM_LABEL_STYLE) { "Who paid" }

                    input
                        type="text"
                        name="user"
                        id="user"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required;
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    type="number"
                    name="amount"
                    id="amount"
                    step="0.01"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    type="date"
                    name="date"
                    id="date"
                    value=(today)
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            div
            {
                label for="reason" class=(FORM_LABEL_STYLE) { "Reason" }

                input
                    type="text"
                    name="reason"
                    id="reason"
                    placeholder="e.g. groceries"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add" }
        }
    }
}

/// A table of transactions in insertion order.
pub(crate) fn transactions_table(transactions: &[Transaction]) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "User" }
                        th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Reason" }
                    }
                }
                tbody
                {
                    @for transaction in transactions {
                        (transaction_row(transaction))
                    }
                }
            }
        }
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(transaction.date) { (transaction.date) }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.username) }
            td class={ (TABLE_CELL_STYLE) " text-right whitespace-nowrap" }
            {
                (format_currency(transaction.amount))
            }
            td class=(TABLE_CELL_STYLE)
            {
                @match transaction.reason.as_deref() {
                    Some(reason) => {
                        @let (display_text, tooltip) = format_reason(reason);
                        span title=[tooltip] { (display_text) }
                    }
                    None => {
                        span class="text-gray-400 dark:text-gray-500" { "-" }
                    }
                }
            }
        }
    }
}

/// A table of the summed expenses per calendar day, dates ascending.
pub(crate) fn daily_totals_table(daily_rows: &[(Date, f64)]) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Total" }
                    }
                }
                tbody
                {
                    @for (date, day_total) in daily_rows {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE)
                            {
                                time datetime=(date) { (date) }
                            }
                            td class={ (TABLE_CELL_STYLE) " text-right whitespace-nowrap" }
                            {
                                (format_currency(*day_total))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn per_user_table(user_rows: &[(String, f64)], link_user_pages: bool) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "User" }
                        th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Total" }
                    }
                }
                tbody
                {
                    @for (username, user_total) in user_rows {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE)
                            {
                                @if link_user_pages {
                                    a
                                        href=(format_endpoint(endpoints::USER_VIEW, username))
                                        class=(LINK_STYLE)
                                    {
                                        (username)
                                    }
                                } @else {
                                    (username)
                                }
                            }
                            td class={ (TABLE_CELL_STYLE) " text-right whitespace-nowrap" }
                            {
                                (format_currency(*user_total))
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Truncate long reason text for table rows.
///
/// Returns the text to display and, when it was truncated, the full text for
/// a tooltip.
fn format_reason(reason: &str) -> (String, Option<&str>) {
    let reason_length = reason.graphemes(true).count();

    if reason_length <= MAX_REASON_GRAPHEMES {
        (reason.to_owned(), None)
    } else {
        let truncated: String = reason
            .graphemes(true)
            .take(MAX_REASON_GRAPHEMES - 3)
            .collect();
        let truncated = truncated + "...";
        (truncated, Some(reason))
    }
}

#[cfg(test)]
mod format_reason_tests {
    use unicode_segmentation::UnicodeSegmentation;

    use super::{MAX_REASON_GRAPHEMES, format_reason};

    #[test]
    fn short_reason_is_unchanged() {
        assert_eq!(format_reason("groceries"), ("groceries".to_owned(), None));
    }

    #[test]
    fn long_reason_is_truncated_with_tooltip() {
        let reason = "a".repeat(MAX_REASON_GRAPHEMES + 1);

        let (display_text, tooltip) = format_reason(&reason);

        assert!(display_text.ends_with("..."));
        assert_eq!(display_text.graphemes(true).count(), MAX_REASON_GRAPHEMES);
        assert_eq!(tooltip, Some(reason.as_str()));
    }

    #[test]
    fn truncation_counts_graphemes_not_bytes() {
        // Each flag emoji is one grapheme but several bytes.
        let reason = "🏳️‍🌈".repeat(MAX_REASON_GRAPHEMES);

        let (display_text, tooltip) = format_reason(&reason);

        assert!(display_text.ends_with("..."));
        assert!(tooltip.is_some());
    }
}

#[cfg(test)]
mod dashboard_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        MemoryAppState, PasswordHash,
        db::initialize,
        ledger::create_transaction,
        test_utils::{assert_valid_html, parse_html_document},
        user::create_user,
    };

    use super::{DashboardState, get_dashboard_page, get_memory_dashboard_page};

    fn get_test_state() -> DashboardState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn dashboard_renders_transactions_and_totals() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let alice =
                create_user("alice", PasswordHash::new_unchecked("hunter2"), &connection).unwrap();
            let bob =
                create_user("bob", PasswordHash::new_unchecked("hunter2"), &connection).unwrap();
            create_transaction(
                alice.id,
                date!(2024 - 01 - 01),
                30.0,
                Some("groceries"),
                &connection,
            )
            .unwrap();
            create_transaction(bob.id, date!(2024 - 01 - 01), 10.0, None, &connection).unwrap();
        }

        let response = get_dashboard_page(State(state)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        // Two users on the same day appear as one daily total of $40.00.
        assert_page_contains_text(&document, "$40.00");
        assert_page_contains_text(&document, "groceries");
        assert_page_contains_text(&document, "alice");
        assert_page_contains_text(&document, "bob");
    }

    #[tokio::test]
    async fn dashboard_add_form_has_no_username_field() {
        let response = get_dashboard_page(State(get_test_state())).await.unwrap();
        let document = parse_html_document(response).await;

        let user_input_selector = Selector::parse("input[name=user]").unwrap();
        assert!(
            document.select(&user_input_selector).next().is_none(),
            "the account server takes the payer from the session, the form must not ask"
        );
    }

    #[tokio::test]
    async fn user_with_no_transactions_appears_with_zero_total() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_user("carol", PasswordHash::new_unchecked("hunter2"), &connection).unwrap();
        }

        let response = get_dashboard_page(State(state)).await.unwrap();
        let document = parse_html_document(response).await;

        assert_page_contains_text(&document, "carol");
        assert_page_contains_text(&document, "$0.00");
    }

    #[tokio::test]
    async fn memory_dashboard_asks_who_paid_and_links_user_pages() {
        let state = MemoryAppState::new("Etc/UTC");
        state
            .ledger
            .lock()
            .unwrap()
            .add_transaction("alice", date!(2024 - 01 - 01), 12.5, None)
            .unwrap();

        let response = get_memory_dashboard_page(State(state)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let user_input_selector = Selector::parse("input[name=user]").unwrap();
        assert!(
            document.select(&user_input_selector).next().is_some(),
            "the in-memory server must ask who paid"
        );

        let user_link_selector = Selector::parse("a[href='/user/alice']").unwrap();
        assert!(
            document.select(&user_link_selector).next().is_some(),
            "want a link to alice's page"
        );
    }

    #[tokio::test]
    async fn empty_ledger_shows_prompt_text() {
        let state = MemoryAppState::new("Etc/UTC");

        let response = get_memory_dashboard_page(State(state)).await.unwrap();
        let document = parse_html_document(response).await;

        assert_page_contains_text(&document, "Nothing here yet");
    }

    #[track_caller]
    fn assert_page_contains_text(document: &Html, want: &str) {
        let text: String = document.root_element().text().collect();
        assert!(
            text.contains(want),
            "want page text to contain {want:?}, got {text:?}"
        );
    }
}
