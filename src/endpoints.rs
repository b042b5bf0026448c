//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/user/{username}', use [format_endpoint].

/// The dashboard: transactions, totals and aggregates, plus the add-transaction form.
pub const DASHBOARD_VIEW: &str = "/";
/// The page for displaying a single user's transactions and daily totals.
pub const USER_VIEW: &str = "/user/{username}";
/// The route for adding a transaction.
pub const ADD_TRANSACTION: &str = "/add";
/// The page for splitting an expense across users, and the route that performs the split.
pub const SPLIT_VIEW: &str = "/split";
/// The route for getting the sign-up page and registering a user.
pub const SIGN_UP_VIEW: &str = "/signup";
/// The route for getting the log in page and logging in.
pub const LOG_IN_VIEW: &str = "/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/logout";
/// The route for instructions for resetting the user's password.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot-password";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/user/{username}', '{username}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: &str) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}
