//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod activity_logs;
pub mod allocation_rules;
pub mod auth;
pub mod business_units;
pub mod categories;
pub mod employees;
pub mod health;
pub mod partners;
pub mod payment_methods;
pub mod transactions;
pub mod users;

/// Default for `isActive` fields omitted from request bodies.
pub(crate) const fn default_true() -> bool {
    true
}

/// Trims a string and turns blanks into `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Creates the API router. Everything except health and login needs a token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(users::routes())
        .merge(business_units::routes())
        .merge(categories::routes())
        .merge(payment_methods::routes())
        .merge(partners::routes())
        .merge(employees::routes())
        .merge(allocation_rules::routes())
        .merge(transactions::routes())
        .merge(activity_logs::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
