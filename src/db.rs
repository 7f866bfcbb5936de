//! Sets up the application's SQLite database.

use rusqlite::{Connection, Params, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, account::create_account_table, transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the application's tables if they do not exist yet and enable
/// foreign key enforcement on `connection`.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_account_table(&transaction)?;
    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Run a `SELECT COUNT(...)` query and return the count.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub(crate) fn query_count(
    sql: &str,
    params: impl Params,
    connection: &Connection,
) -> Result<u64, Error> {
    let count: i64 = connection.query_row(sql, params, |row| row.get(0))?;

    // COUNT is never negative.
    Ok(count.unsigned_abs())
}
