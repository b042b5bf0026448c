//! The page for splitting one expense evenly across several users.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form: the multi-valued `users` checkboxes need its
// serde_html_form-based deserializer.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, MemoryAppState, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_INPUT_STYLE, FORM_CHECKBOX_LABEL_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
    },
    ledger::split_expense,
    navigation::NavBar,
    timezone::get_local_offset,
    user::get_all_usernames,
};

/// The state needed for the split page of the SQLite-backed server.
#[derive(Debug, Clone)]
pub struct SplitPageState {
    /// The database connection for reading users and recording shares.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for SplitPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for splitting an expense.
#[derive(Debug, Deserialize)]
pub struct SplitForm {
    /// The total value of the expense in dollars, before splitting.
    pub amount: f64,
    /// The date when the expense occurred.
    pub date: Date,
    /// Optional text detailing what the expense was for.
    #[serde(default)]
    pub reason: Option<String>,
    /// The usernames sharing the expense. Empty when no checkbox is ticked.
    #[serde(default)]
    pub users: Vec<String>,
}

fn split_view(
    nav_bar: NavBar,
    today: Date,
    usernames: &[String],
    error_message: Option<&str>,
) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Split an expense" }

                @if usernames.is_empty() {
                    p
                    {
                        "Nobody to split with yet. An expense can be split once
                        there are users to share it."
                    }
                } @else {
                    (split_form(today, usernames, error_message))
                }
            }
        }
    );

    base("Split", &content)
}

fn split_form(today: Date, usernames: &[String], error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::SPLIT_VIEW)
            class="space-y-4 bg-gray-50 dark:bg-gray-800 p-4 rounded-lg"
        {
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
                    placeholder="e.g. dinner"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Split between" }

                div class="grid grid-cols-2 gap-2"
                {
                    @for username in usernames {
                        label class=(FORM_CHECKBOX_LABEL_STYLE)
                        {
                            input
                                type="checkbox"
                                name="users"
                                value=(username)
                                class=(FORM_CHECKBOX_INPUT_STYLE);

                            span { (username) }
                        }
                    }
                }
            }

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Split" }
        }
    }
}

/// Display the split form with a checkbox per registered user.
pub async fn get_split_page(State(state): State<SplitPageState>) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone)?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let usernames = get_all_usernames(&connection)?;
    drop(connection);

    let nav_bar = NavBar::new(endpoints::SPLIT_VIEW);

    Ok(split_view(nav_bar, today, &usernames, None).into_response())
}

/// Record one share per selected user, all inside a single database
/// transaction, then redirect to the dashboard.
///
/// Errors that the user can fix re-render the form with a message; nothing is
/// recorded unless every share is.
pub async fn post_split(
    State(state): State<SplitPageState>,
    Form(form): Form<SplitForm>,
) -> Response {
    let local_timezone = match get_local_offset(&state.local_timezone) {
        Ok(offset) => offset,
        Err(error) => return error.into_response(),
    };
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let result = split_expense(
        form.amount,
        form.date,
        form.reason.as_deref(),
        &form.users,
        &mut connection,
    );

    match result {
        Ok(_) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::NoParticipants | Error::UnknownUser(_) | Error::MalformedInput(_)),
        ) => {
            let usernames = match get_all_usernames(&connection) {
                Ok(usernames) => usernames,
                Err(error) => return error.into_response(),
            };
            let nav_bar = NavBar::new(endpoints::SPLIT_VIEW);

            (
                StatusCode::UNPROCESSABLE_ENTITY,
                split_view(nav_bar, today, &usernames, Some(&error.to_string())),
            )
                .into_response()
        }
        Err(error) => error.into_response(),
    }
}

/// Display the split form for the in-memory server, with a checkbox per user
/// seen so far.
pub async fn get_memory_split_page(State(state): State<MemoryAppState>) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone)?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let ledger = state
        .ledger
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire ledger lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let usernames = ledger.users().to_vec();
    drop(ledger);

    let nav_bar = NavBar::new_memory(endpoints::SPLIT_VIEW);

    Ok(split_view(nav_bar, today, &usernames, None).into_response())
}

/// Record one share per selected user in the in-memory ledger, then redirect
/// to the dashboard.
pub async fn post_memory_split(
    State(state): State<MemoryAppState>,
    Form(form): Form<SplitForm>,
) -> Response {
    let local_timezone = match get_local_offset(&state.local_timezone) {
        Ok(offset) => offset,
        Err(error) => return error.into_response(),
    };
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let mut ledger = match state.ledger.lock() {
        Ok(ledger) => ledger,
        Err(error) => {
            tracing::error!("could not acquire ledger lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match ledger.split_expense(form.amount, form.date, form.reason.as_deref(), &form.users) {
        Ok(_) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::NoParticipants | Error::MalformedInput(_))) => {
            let usernames = ledger.users().to_vec();
            drop(ledger);
            let nav_bar = NavBar::new_memory(endpoints::SPLIT_VIEW);

            (
                StatusCode::UNPROCESSABLE_ENTITY,
                split_view(nav_bar, today, &usernames, Some(&error.to_string())),
            )
                .into_response()
        }
        Err(error) => error.into_response(),
    }
}


#[cfg(test)]
mod split_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        MemoryAppState, PasswordHash,
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
        user::create_user,
    };

    use super::{SplitPageState, get_memory_split_page, get_split_page};

    #[tokio::test]
    async fn split_page_lists_registered_users_as_checkboxes() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        create_user("alice", PasswordHash::new_unchecked("hunter2"), &connection).unwrap();
        create_user("bob", PasswordHash::new_unchecked("hunter2"), &connection).unwrap();
        let state = SplitPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_split_page(State(state)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let checkbox_selector = Selector::parse("input[type=checkbox][name=users]").unwrap();
        let values: Vec<_> = document
            .select(&checkbox_selector)
            .filter_map(|input| input.value().attr("value"))
            .collect();
        assert_eq!(values, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn memory_split_page_prompts_when_no_users_exist() {
        let state = MemoryAppState::new("Etc/UTC");

        let response = get_memory_split_page(State(state)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        let checkbox_selector = Selector::parse("input[type=checkbox]").unwrap();
        assert!(document.select(&checkbox_selector).next().is_none());

        let text: String = document.root_element().text().collect();
        assert!(text.contains("Nobody to split with yet"));
    }
}
