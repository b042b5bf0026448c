//! User authentication: private session cookies, the guard middleware,
//! redirect URL helpers and the log-in page.

pub(crate) mod cookie;
mod log_in;
mod middleware;
mod redirect;

pub use log_in::{get_log_in_page, post_log_in};
pub use middleware::{auth_guard, auth_guard_hx};

pub(crate) use cookie::invalidate_auth_cookie;

#[cfg(test)]
pub(crate) use log_in::LogInData;
