//! Route handlers for transactions and their tags.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    database_id::{AccountId, TransactionId, UserId},
    pagination::{ListQuery, Page, PaginationConfig},
    stats::collect_distinct_tags,
    success::Success,
    transaction::{
        core::{
            NewTransaction, PopulatedTransaction, Transaction, TransactionType,
            create_transaction, delete_transaction, get_populated_transaction,
            update_transaction,
        },
        query::{TransactionSearch, get_transaction_tags, list_transactions},
    },
};

/// The state needed to manage transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config for paging transaction lists.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The request body for creating or replacing a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionForm {
    /// The non-negative amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// What the transaction was for.
    #[serde(default)]
    pub description: String,
    /// When the transaction happened, today if not given.
    #[serde(default)]
    pub date: Option<Date>,
    /// Labels for the transaction.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Income or expense, an expense if not given.
    #[serde(default, rename = "type")]
    pub kind: TransactionType,
    /// The account the transaction is recorded against.
    pub account_id: AccountId,
    /// The user that owns the transaction.
    pub user_id: UserId,
}

impl From<TransactionForm> for NewTransaction {
    fn from(form: TransactionForm) -> Self {
        let new_transaction = Transaction::build(form.amount, form.account_id, form.user_id)
            .description(&form.description)
            .tags(form.tags)
            .kind(form.kind);

        match form.date {
            Some(date) => new_transaction.date(date),
            None => new_transaction,
        }
    }
}

/// The transaction specific query parameters for reading transactions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListOptions {
    /// A JSON encoded [TransactionSearch].
    pub search: Option<String>,
    /// Set to `1` to leave the account and user off each row.
    pub no_populate: Option<String>,
}

impl TransactionListOptions {
    fn populate(&self) -> bool {
        !matches!(self.no_populate.as_deref(), Some("1" | "true"))
    }

    fn search(&self) -> Result<TransactionSearch, Error> {
        match self.search.as_deref() {
            None | Some("") => Ok(TransactionSearch::default()),
            Some(raw_search) => TransactionSearch::from_json(raw_search),
        }
    }
}

/// A route handler for listing transactions.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Query(query): Query<ListQuery>,
    Query(options): Query<TransactionListOptions>,
) -> Result<Json<Page<PopulatedTransaction>>, Error> {
    let search = options.search()?;
    let connection = lock_connection(&state.db_connection)?;

    list_transactions(
        &query,
        &search,
        options.populate(),
        &state.pagination_config,
        &connection,
    )
    .map(Json)
}

/// A route handler for creating a new transaction, responds with the stored transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Json(form): Json<TransactionForm>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let transaction = create_transaction(form.into(), &connection)?;
    tracing::debug!("Created transaction {}", transaction.id);

    Ok(Json(transaction))
}

/// A route handler for getting a transaction with its account and user.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Query(options): Query<TransactionListOptions>,
) -> Result<Json<PopulatedTransaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let transaction = get_populated_transaction(transaction_id, &connection)?;

    if options.populate() {
        Ok(Json(transaction))
    } else {
        Ok(Json(transaction.unpopulated()))
    }
}

/// A route handler for replacing a transaction.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Json(form): Json<TransactionForm>,
) -> Result<Json<Success>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    update_transaction(transaction_id, form.into(), &connection)?;

    Ok(Success::json())
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Success>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_transaction(transaction_id, &connection)?;
    tracing::debug!("Deleted transaction {transaction_id}");

    Ok(Success::json())
}

/// A route handler for the sorted, distinct tags used across all transactions.
pub async fn get_tags_endpoint(
    State(state): State<TransactionState>,
) -> Result<Json<Vec<String>>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let tag_lists = get_transaction_tags(&connection)?;

    Ok(Json(collect_distinct_tags(tag_lists.iter().map(Vec::as_slice))))
}
