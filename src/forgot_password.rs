//! A static page telling the user how to reset their password.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{auth_card, base, link},
};

fn forgot_password_template() -> Markup {
    let explanation = html! {
        p class="text-justify text-gray-900 dark:text-white"
        {
            "Passwords can only be reset from the machine the server runs on. \
            Ask whoever operates the server to run the bundled "
            code { "reset_password" }
            " program against the database file and set a new password for \
            your account."
        }

        p
        {
            (link(endpoints::LOG_IN_VIEW, "Back to log-in"))
        }
    };

    let content = auth_card("Forgot your password?", &explanation);

    base("Forgot Password", &content)
}

/// Renders a page describing how the user's password can be reset.
pub async fn get_forgot_password_page() -> Response {
    forgot_password_template().into_response()
}
