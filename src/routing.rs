//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, get_account_endpoint,
        list_accounts_endpoint, update_account_endpoint,
    },
    endpoints,
    error::ErrorMessage,
    stats::{get_account_stats_endpoint, get_user_stats_endpoint},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_tags_endpoint,
        get_transaction_endpoint, list_transactions_endpoint, update_transaction_endpoint,
    },
    user::{
        create_user_endpoint, delete_user_endpoint, get_user_endpoint, list_users_endpoint,
        update_user_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::ACCOUNTS,
            get(list_accounts_endpoint).post(create_account_endpoint),
        )
        .route(
            endpoints::ACCOUNT,
            get(get_account_endpoint)
                .put(update_account_endpoint)
                .delete(delete_account_endpoint),
        )
        .route(
            endpoints::USERS,
            get(list_users_endpoint).post(create_user_endpoint),
        )
        .route(
            endpoints::USER,
            get(get_user_endpoint)
                .put(update_user_endpoint)
                .delete(delete_user_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION_TAGS, get(get_tags_endpoint))
        .route(endpoints::ACCOUNT_STATS, get(get_account_stats_endpoint))
        .route(endpoints::USER_STATS, get(get_user_stats_endpoint))
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .fallback(get_404_not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The JSON response for any route that does not exist.
async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorMessage {
            message: "Not found".to_owned(),
        }),
    )
        .into_response()
}
