//! Defines the core data models and database queries for transactions.

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    account::{Account, map_row_to_account_with_offset},
    database_id::{AccountId, TransactionId, UserId},
    db::query_count,
    money::{from_cents, to_cents},
    user::{User, map_row_to_user_with_offset},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money that was earned.
    Income,
    /// Money that was spent.
    #[default]
    Expense,
}

impl TransactionType {
    /// The name stored in the database and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Apply the sign of this transaction type to a non-negative `amount`.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense => -amount,
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown transaction type \"{other}\"").into(),
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The non-negative amount of money spent or earned.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// Free-form labels, e.g. "groceries".
    pub tags: Vec<String>,
    /// Whether the amount was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The account the transaction was recorded against.
    pub account_id: AccountId,
    /// The user that owns the transaction.
    pub user_id: UserId,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(amount: Decimal, account_id: AccountId, user_id: UserId) -> NewTransaction {
        NewTransaction {
            amount,
            description: String::new(),
            date: OffsetDateTime::now_utc().date(),
            tags: Vec::new(),
            kind: TransactionType::default(),
            account_id,
            user_id,
        }
    }
}

/// A transaction together with the account and user it references.
///
/// The references are left out of the JSON when they were not requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulatedTransaction {
    /// The transaction itself.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The account the transaction was recorded against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
    /// The user that owns the transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl PopulatedTransaction {
    /// Drop the account and user so only the transaction fields are serialized.
    pub fn unpopulated(self) -> Self {
        Self {
            account: None,
            user: None,
            ..self
        }
    }
}

/// A builder for creating and updating [Transaction] instances.
///
/// The description defaults to an empty string, the date to today (UTC), the
/// tags to none and the type to [TransactionType::Expense].
///
/// # Examples
///
/// ```ignore
/// use rust_decimal::Decimal;
/// use time::macros::date;
///
/// use crate::transaction::{Transaction, TransactionType};
///
/// let new_transaction = Transaction::build(Decimal::new(4599, 2), 1, 2)
///     .description("Coffee beans")
///     .date(date!(2025 - 01 - 15))
///     .tags(vec!["groceries".to_owned()])
///     .kind(TransactionType::Expense);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The non-negative amount, rounded to cents when stored.
    pub amount: Decimal,
    /// A human-readable description, trimmed when stored.
    pub description: String,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Labels for the transaction. Blank tags are dropped and tags containing a comma are rejected.
    pub tags: Vec<String>,
    /// Whether the amount was earned or spent.
    pub kind: TransactionType,
    /// The account the transaction is recorded against.
    pub account_id: AccountId,
    /// The user that owns the transaction.
    pub user_id: UserId,
}

impl NewTransaction {
    /// Set the description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the date.
    pub fn date(mut self, date: Date) -> Self {
        self.date = date;
        self
    }

    /// Set the tags.
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Set whether the transaction is income or an expense.
    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = kind;
        self
    }
}

/// The validated column values for inserting or updating a transaction row.
struct TransactionRow {
    amount_cents: i64,
    description: String,
    date: Date,
    tags: String,
    kind: TransactionType,
    account_id: AccountId,
    user_id: UserId,
}

impl TryFrom<NewTransaction> for TransactionRow {
    type Error = Error;

    fn try_from(new_transaction: NewTransaction) -> Result<Self, Self::Error> {
        if new_transaction.amount < Decimal::ZERO {
            return Err(Error::NegativeAmount(new_transaction.amount));
        }

        if let Some(tag) = new_transaction.tags.iter().find(|tag| tag.contains(',')) {
            return Err(Error::InvalidTag(tag.clone()));
        }

        Ok(Self {
            amount_cents: to_cents(new_transaction.amount)?,
            description: new_transaction.description.trim().to_owned(),
            date: new_transaction.date,
            tags: join_tags(&new_transaction.tags),
            kind: new_transaction.kind,
            account_id: new_transaction.account_id,
            user_id: new_transaction.user_id,
        })
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The transaction columns in the order expected by [map_transaction_row].
pub(crate) const TRANSACTION_COLUMNS: &str = "\"transaction\".id, \"transaction\".amount_cents, \
    \"transaction\".description, \"transaction\".date, \"transaction\".tags, \
    \"transaction\".type, \"transaction\".account_id, \"transaction\".user_id";

/// The joined account and user columns that follow [TRANSACTION_COLUMNS].
pub(crate) const REFERENCE_COLUMNS: &str =
    "account.id, account.name, user.id, user.name, user.email, user.is_shared, user.is_public";

/// The `FROM` clause joining transactions to their account and user.
pub(crate) const POPULATED_FROM: &str = "FROM \"transaction\" \
    INNER JOIN account ON \"transaction\".account_id = account.id \
    INNER JOIN user ON \"transaction\".user_id = user.id";

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '',
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                account_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Indexes used by the search filters and the user balance query.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user ON \"transaction\"(user_id);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is below zero,
/// - [Error::InvalidTag] if a tag contains a comma,
/// - [Error::InvalidReference] if the account or user does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let row = TransactionRow::try_from(new_transaction)?;

    connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (amount_cents, description, date, tags, type, account_id, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                row.amount_cents,
                &row.description,
                row.date,
                &row.tags,
                row.kind,
                row.account_id,
                row.user_id,
            ),
            map_transaction_row,
        )
        .map_err(map_foreign_key_error)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(Error::from)
}

/// Retrieve a transaction by its `id` together with its account and user.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_populated_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<PopulatedTransaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS}, {REFERENCE_COLUMNS} {POPULATED_FROM} \
            WHERE \"transaction\".id = :id"
        ))?
        .query_row(&[(":id", &id)], map_populated_transaction_row)
        .map_err(Error::from)
}

/// Replace every field of the transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is below zero,
/// - [Error::InvalidTag] if a tag contains a comma,
/// - [Error::InvalidReference] if the account or user does not exist,
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<(), Error> {
    let row = TransactionRow::try_from(new_transaction)?;

    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\"
            SET \
                amount_cents = ?1, \
                description = ?2, \
                date = ?3, \
                tags = ?4, \
                type = ?5, \
                account_id = ?6, \
                user_id = ?7 \
            WHERE id = ?8",
            (
                row.amount_cents,
                &row.description,
                row.date,
                &row.tags,
                row.kind,
                row.account_id,
                row.user_id,
                id,
            ),
        )
        .map_err(map_foreign_key_error)?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete the transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u64, Error> {
    query_count("SELECT COUNT(id) FROM \"transaction\";", [], connection)
}

/// Map a database row selected with [TRANSACTION_COLUMNS] to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount_cents: i64 = row.get(1)?;
    let description = row.get(2)?;
    let date = row.get(3)?;
    let raw_tags: String = row.get(4)?;
    let kind = row.get(5)?;
    let account_id = row.get(6)?;
    let user_id = row.get(7)?;

    Ok(Transaction {
        id,
        amount: from_cents(amount_cents),
        description,
        date,
        tags: split_tags(&raw_tags),
        kind,
        account_id,
        user_id,
    })
}

/// Map a row selected with [TRANSACTION_COLUMNS] and [REFERENCE_COLUMNS].
pub(crate) fn map_populated_transaction_row(
    row: &Row,
) -> Result<PopulatedTransaction, rusqlite::Error> {
    Ok(PopulatedTransaction {
        transaction: map_transaction_row(row)?,
        account: Some(map_row_to_account_with_offset(row, 8)?),
        user: Some(map_row_to_user_with_offset(row, 10)?),
    })
}

/// Split the stored comma separated tags, ignoring blanks.
pub(crate) fn split_tags(raw_tags: &str) -> Vec<String> {
    raw_tags
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

fn join_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

fn map_foreign_key_error(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::InvalidReference,
        error => error.into(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
