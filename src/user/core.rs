//! Code for creating the user table and reading and writing users in the database.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error, PasswordHash,
    database_id::UserId,
    db::query_count,
    pagination::{ListQuery, Page, PaginationConfig, SortDirection},
};

/// A person, or a pooled group of people, that owns transactions.
///
/// A shared user (`all` on the wire) stands for a joint account or an
/// organisation. Its transactions are split evenly across the individual
/// users when computing user balances.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The unique display name of the user.
    pub name: String,
    /// The user's email address.
    pub email: Option<String>,
    /// Whether the user represents a shared pool rather than an individual.
    #[serde(rename = "all")]
    pub shared: bool,
    /// Whether the user may log in.
    pub public: bool,
}

/// The fields needed to create or update a user, without the password.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDetails {
    /// The display name, trimmed before it is stored.
    pub name: String,
    /// The user's email address.
    pub email: Option<String>,
    /// Whether the user represents a shared pool rather than an individual.
    pub shared: bool,
    /// Whether the user may log in.
    pub public: bool,
}

impl UserDetails {
    /// Check the invariants that are not enforced by the database.
    ///
    /// # Errors
    /// Returns [Error::MissingEmail] if the user is public but has no email.
    pub fn validate(self) -> Result<Self, Error> {
        let email = self
            .email
            .map(|email| email.trim().to_owned())
            .filter(|email| !email.is_empty());

        if self.public && email.is_none() {
            return Err(Error::MissingEmail);
        }

        Ok(Self {
            name: self.name.trim().to_owned(),
            email,
            ..self
        })
    }
}

/// The columns a user list can be sorted by.
const SORT_COLUMNS: [(&str, &str); 5] = [
    ("id", "id"),
    ("name", "name"),
    ("email", "email"),
    ("all", "is_shared"),
    ("public", "is_public"),
];

const USER_COLUMNS: &str = "id, name, email, is_shared, is_public";

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                email TEXT,
                password TEXT NOT NULL,
                is_shared INTEGER NOT NULL DEFAULT 0,
                is_public INTEGER NOT NULL DEFAULT 0
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row with the columns `id, name, email, is_shared, is_public` to a [User].
pub fn map_row_to_user(row: &Row) -> Result<User, rusqlite::Error> {
    map_row_to_user_with_offset(row, 0)
}

/// Map the user columns starting at `offset` of a joined row to a [User].
pub fn map_row_to_user_with_offset(row: &Row, offset: usize) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        email: row.get(offset + 2)?,
        shared: row.get(offset + 3)?,
        public: row.get(offset + 4)?,
    })
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::MissingEmail] if a public user has no email,
/// - [Error::DuplicateUserName] if the name is taken,
/// - or [Error::SqlError] if an SQL related error occurred.
pub fn create_user(
    details: UserDetails,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let details = details.validate()?;

    connection
        .prepare(&format!(
            "INSERT INTO user (name, email, password, is_shared, is_public)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {USER_COLUMNS}"
        ))?
        .query_row(
            (
                &details.name,
                &details.email,
                password_hash.as_ref(),
                details.shared,
                details.public,
            ),
            map_row_to_user,
        )
        .map_err(|error| map_unique_name_error(error, &details.name))
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE id = :id"))?
        .query_row(&[(":id", &user_id)], map_row_to_user)
        .map_err(Error::from)
}

/// Get the user named `name`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has that name.
pub fn get_user_by_name(name: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE name = :name"))?
        .query_row(&[(":name", &name)], map_row_to_user)
        .map_err(Error::from)
}

/// Get the stored password hash for `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a user.
pub fn get_password_hash(user_id: UserId, connection: &Connection) -> Result<PasswordHash, Error> {
    connection
        .query_row(
            "SELECT password FROM user WHERE id = ?1",
            [user_id],
            |row| {
                let raw_password_hash: String = row.get(0)?;
                Ok(PasswordHash::new_unchecked(&raw_password_hash))
            },
        )
        .map_err(Error::from)
}

/// Retrieve a page of users, sorted by name unless the query says otherwise.
///
/// # Errors
/// Returns an [Error::InvalidSortColumn] for an unknown `sortBy` field or an
/// [Error::SqlError] if the query fails.
pub fn list_users(
    query: &ListQuery,
    pagination_config: &PaginationConfig,
    connection: &Connection,
) -> Result<Page<User>, Error> {
    let order_by = query.order_by(&SORT_COLUMNS, ("name", SortDirection::Asc))?;
    let limit = query.limit_clause(pagination_config);

    let count = count_users(connection)?;

    let rows = connection
        .prepare(&format!(
            "SELECT {USER_COLUMNS} FROM user ORDER BY {order_by}, id ASC {limit}"
        ))?
        .query_map([], map_row_to_user)?
        .map(|maybe_user| maybe_user.map_err(Error::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page { count, rows })
}

/// Update the details of `user_id`, and its password if `password_hash` is given.
///
/// # Errors
///
/// Returns a:
/// - [Error::MissingEmail] if a public user has no email,
/// - [Error::UpdateMissingUser] if `user_id` does not belong to a user,
/// - [Error::DuplicateUserName] if another user already has the name,
/// - or [Error::SqlError] if an SQL related error occurred.
pub fn update_user(
    user_id: UserId,
    details: UserDetails,
    password_hash: Option<&PasswordHash>,
    connection: &Connection,
) -> Result<(), Error> {
    let details = details.validate()?;

    let rows_affected = connection
        .execute(
            "UPDATE user
            SET \
                name = ?1, \
                email = ?2, \
                is_shared = ?3, \
                is_public = ?4, \
                password = COALESCE(?5, password) \
            WHERE id = ?6",
            (
                &details.name,
                &details.email,
                details.shared,
                details.public,
                password_hash.map(PasswordHash::as_ref),
                user_id,
            ),
        )
        .map_err(|error| map_unique_name_error(error, &details.name))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingUser);
    }

    Ok(())
}

/// Replace the password of `user_id`.
///
/// # Errors
///
/// Returns [Error::UpdateMissingUser] if `user_id` does not belong to a user.
pub fn update_password(
    user_id: UserId,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingUser);
    }

    Ok(())
}

/// Delete the user `user_id` along with their transactions.
///
/// # Errors
///
/// Returns [Error::DeleteMissingUser] if `user_id` does not belong to a user.
pub fn delete_user(user_id: UserId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM user WHERE id = ?1", [user_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingUser);
    }

    Ok(())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<u64, Error> {
    query_count("SELECT COUNT(id) FROM user;", [], connection)
}

fn map_unique_name_error(error: rusqlite::Error, name: &str) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateUserName(name.to_owned()),
        error => error.into(),
    }
}
