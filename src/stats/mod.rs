//! Balances per account and per user.
//!
//! Transactions owned by a shared user are split evenly across the
//! individual users when computing user balances.

mod aggregation;
mod db;
mod endpoints;

pub use aggregation::{
    AccountBalance, AccountBalances, LedgerEntry, UserBalance, UserBalances,
    collect_distinct_tags, compute_account_balances, compute_user_balances,
    compute_user_balances_for,
};
pub use db::{get_account_ledger, get_user_ledger};
pub use endpoints::{get_account_stats_endpoint, get_user_stats_endpoint};
