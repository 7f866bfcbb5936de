//! Route handlers for listing, creating, reading, updating and deleting users.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash,
    app_state::lock_connection,
    database_id::UserId,
    pagination::{ListQuery, Page, PaginationConfig},
    success::Success,
    user::core::{
        User, UserDetails, create_user, delete_user, get_user, list_users, update_user,
    },
};

/// The state needed to manage users.
#[derive(Debug, Clone)]
pub struct UserState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config for paging user lists.
    pub pagination_config: PaginationConfig,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for UserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
            password_hash_cost: state.password_hash_cost,
        }
    }
}

/// The request body for creating or updating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserForm {
    /// The display name.
    pub name: String,
    /// The email address, required for public users.
    #[serde(default)]
    pub email: Option<String>,
    /// Whether the user represents a shared pool.
    #[serde(default, rename = "all")]
    pub shared: bool,
    /// Whether the user may log in.
    #[serde(default)]
    pub public: bool,
    /// The raw password. Required on creation, optional on update.
    #[serde(default)]
    pub password: Option<String>,
}

impl UserForm {
    fn details(&self) -> UserDetails {
        UserDetails {
            name: self.name.clone(),
            email: self.email.clone(),
            shared: self.shared,
            public: self.public,
        }
    }
}

/// A route handler for listing users.
pub async fn list_users_endpoint(
    State(state): State<UserState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<User>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_users(&query, &state.pagination_config, &connection).map(Json)
}

/// A route handler for creating a user, responds with the new user.
///
/// The password is checked for strength and stored as a bcrypt hash.
pub async fn create_user_endpoint(
    State(state): State<UserState>,
    Json(form): Json<UserForm>,
) -> Result<Json<User>, Error> {
    let raw_password = form.password.as_deref().unwrap_or_default();
    let password_hash = PasswordHash::from_raw_password(raw_password, state.password_hash_cost)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = create_user(form.details(), &password_hash, &connection)?;
    tracing::info!("Created user {}", user.id);

    Ok(Json(user))
}

/// A route handler for getting a single user.
pub async fn get_user_endpoint(
    State(state): State<UserState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<User>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_user(user_id, &connection).map(Json)
}

/// A route handler for updating a user.
///
/// An empty or missing password keeps the current password.
pub async fn update_user_endpoint(
    State(state): State<UserState>,
    Path(user_id): Path<UserId>,
    Json(form): Json<UserForm>,
) -> Result<Json<Success>, Error> {
    let password_hash = match form.password.as_deref() {
        None | Some("") => None,
        Some(raw_password) => Some(PasswordHash::from_raw_password(
            raw_password,
            state.password_hash_cost,
        )?),
    };

    let connection = lock_connection(&state.db_connection)?;
    update_user(
        user_id,
        form.details(),
        password_hash.as_ref(),
        &connection,
    )?;

    Ok(Success::json())
}

/// A route handler for deleting a user.
pub async fn delete_user_endpoint(
    State(state): State<UserState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Success>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_user(user_id, &connection)?;
    tracing::info!("Deleted user {user_id}");

    Ok(Success::json())
}
