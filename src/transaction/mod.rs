//! Transactions: money spent or earned by a user against an account.
//!
//! This module contains:
//! - The `Transaction` model and the `NewTransaction` builder
//! - Database functions for storing, searching and paging transactions
//! - Route handlers for the transaction API and the tag list

mod core;
mod endpoints;
mod query;

pub use core::{
    NewTransaction, PopulatedTransaction, Transaction, TransactionType, count_transactions,
    create_transaction, create_transaction_table, delete_transaction, get_populated_transaction,
    get_transaction, map_transaction_row, update_transaction,
};
pub use endpoints::{
    TransactionForm, create_transaction_endpoint, delete_transaction_endpoint,
    get_tags_endpoint, get_transaction_endpoint, list_transactions_endpoint,
    update_transaction_endpoint,
};
pub use query::{TransactionSearch, get_transaction_tags, list_transactions};
