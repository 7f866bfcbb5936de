//! Route handlers for listing, creating, reading, updating and deleting accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    account::core::{
        Account, create_account, delete_account, get_account, list_accounts, update_account,
    },
    app_state::lock_connection,
    database_id::AccountId,
    pagination::{ListQuery, Page, PaginationConfig},
    success::Success,
};

/// The state needed to manage accounts.
#[derive(Debug, Clone)]
pub struct AccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config for paging account lists.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The request body for creating or renaming an account.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountForm {
    /// The account name.
    pub name: String,
}

/// A route handler for listing accounts.
pub async fn list_accounts_endpoint(
    State(state): State<AccountState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Account>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_accounts(&query, &state.pagination_config, &connection).map(Json)
}

/// A route handler for creating an account, responds with the new account.
pub async fn create_account_endpoint(
    State(state): State<AccountState>,
    Json(form): Json<AccountForm>,
) -> Result<Json<Account>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let account = create_account(&form.name, &connection).inspect_err(|error| {
        tracing::debug!("Could not create account with {form:?}: {error}");
    })?;
    tracing::info!("Created account {}", account.id);

    Ok(Json(account))
}

/// A route handler for getting a single account.
pub async fn get_account_endpoint(
    State(state): State<AccountState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Account>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_account(account_id, &connection).map(Json)
}

/// A route handler for renaming an account.
pub async fn update_account_endpoint(
    State(state): State<AccountState>,
    Path(account_id): Path<AccountId>,
    Json(form): Json<AccountForm>,
) -> Result<Json<Success>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    update_account(account_id, &form.name, &connection)?;

    Ok(Success::json())
}

/// A route handler for deleting an account.
pub async fn delete_account_endpoint(
    State(state): State<AccountState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Success>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_account(account_id, &connection).inspect_err(|error| {
        tracing::debug!("Could not delete account {account_id}: {error}");
    })?;
    tracing::info!("Deleted account {account_id}");

    Ok(Success::json())
}
