//! Router configuration for the two server variants.

use axum::{
    Router, middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    AppState, Error, MemoryAppState,
    add_transaction::{post_add_transaction, post_memory_add_transaction},
    auth::{auth_guard, auth_guard_hx, get_log_in_page, post_log_in},
    dashboard::{get_dashboard_page, get_memory_dashboard_page},
    endpoints,
    forgot_password::get_forgot_password_page,
    log_out::get_log_out,
    sign_up::{get_sign_up_page, post_sign_up},
    split_page::{get_memory_split_page, get_split_page, post_memory_split, post_split},
    user_page::get_user_page,
};

/// Return the router for the SQLite-backed server with password accounts.
///
/// Every ledger route sits behind the auth guard; the account routes are
/// open, since they are how a session is established in the first place.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(
            endpoints::LOG_IN_VIEW,
            get(get_log_in_page).post(post_log_in),
        )
        .route(
            endpoints::SIGN_UP_VIEW,
            get(get_sign_up_page).post(post_sign_up),
        )
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::SPLIT_VIEW, get(get_split_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST routes need the HX-Redirect header for auth redirects to
    // work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::ADD_TRANSACTION, post(post_add_transaction))
            .route(endpoints::SPLIT_VIEW, post(post_split))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Return the router for the in-memory server, which has no accounts and so
/// no guarded routes.
pub fn build_memory_router(state: MemoryAppState) -> Router {
    Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_memory_dashboard_page))
        .route(endpoints::USER_VIEW, get(get_user_page))
        .route(endpoints::ADD_TRANSACTION, post(post_memory_add_transaction))
        .route(
            endpoints::SPLIT_VIEW,
            get(get_memory_split_page).post(post_memory_split),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Render the styled 404 page for unknown routes.
async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
