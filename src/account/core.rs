//! Defines the account model and its database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::AccountId,
    db::query_count,
    pagination::{ListQuery, Page, PaginationConfig, SortDirection},
};

/// A bank account, credit card or cash pot that transactions are recorded against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The unique display name of the account.
    pub name: String,
}

/// The columns an account list can be sorted by.
const SORT_COLUMNS: [(&str, &str); 2] = [("id", "id"), ("name", "name")];

/// Create the account table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )",
        (),
    )?;

    Ok(())
}

/// Map a database row with the columns `id, name` to an [Account].
pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    map_row_to_account_with_offset(row, 0)
}

/// Map the account columns starting at `offset` of a joined row to an [Account].
pub fn map_row_to_account_with_offset(
    row: &Row,
    offset: usize,
) -> Result<Account, rusqlite::Error> {
    let id = row.get(offset)?;
    let name = row.get(offset + 1)?;

    Ok(Account { id, name })
}

/// Create a new account named `name`.
///
/// # Errors
/// Returns a:
/// - [Error::DuplicateAccountName] if an account with the same name exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_account(name: &str, connection: &Connection) -> Result<Account, Error> {
    let name = name.trim();

    connection
        .prepare("INSERT INTO account (name) VALUES (?1) RETURNING id, name")?
        .query_row((name,), map_row_to_account)
        .map_err(|error| map_unique_name_error(error, name))
}

/// Retrieve an account by its `id`.
///
/// # Errors
/// Returns a:
/// - [Error::NotFound] if `id` does not refer to a valid account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare("SELECT id, name FROM account WHERE id = :id")?
        .query_row(&[(":id", &id)], map_row_to_account)
        .map_err(Error::from)
}

/// Retrieve a page of accounts, sorted by name unless the query says otherwise.
///
/// # Errors
/// Returns an [Error::InvalidSortColumn] for an unknown `sortBy` field or an
/// [Error::SqlError] if the query fails.
pub fn list_accounts(
    query: &ListQuery,
    pagination_config: &PaginationConfig,
    connection: &Connection,
) -> Result<Page<Account>, Error> {
    let order_by = query.order_by(&SORT_COLUMNS, ("name", SortDirection::Asc))?;
    let limit = query.limit_clause(pagination_config);

    let count = query_count("SELECT COUNT(id) FROM account", [], connection)?;

    let rows = connection
        .prepare(&format!(
            "SELECT id, name FROM account ORDER BY {order_by}, id ASC {limit}"
        ))?
        .query_map([], map_row_to_account)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page { count, rows })
}

/// Rename the account `id`.
///
/// # Errors
/// Returns a:
/// - [Error::UpdateMissingAccount] if `id` does not refer to a valid account,
/// - [Error::DuplicateAccountName] if another account already uses `name`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_account(id: AccountId, name: &str, connection: &Connection) -> Result<(), Error> {
    let name = name.trim();

    let rows_affected = connection
        .execute("UPDATE account SET name = ?1 WHERE id = ?2", (name, id))
        .map_err(|error| map_unique_name_error(error, name))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingAccount);
    }

    Ok(())
}

/// Delete the account `id` along with its transactions.
///
/// # Errors
/// Returns a:
/// - [Error::DeleteMissingAccount] if `id` does not refer to a valid account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_account(id: AccountId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM account WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingAccount);
    }

    Ok(())
}

fn map_unique_name_error(error: rusqlite::Error, name: &str) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateAccountName(name.to_owned()),
        error => error.into(),
    }
}
