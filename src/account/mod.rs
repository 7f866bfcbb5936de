//! Accounts that transactions are recorded against.

mod core;
mod endpoints;

pub use core::{
    Account, create_account, create_account_table, delete_account, get_account, list_accounts,
    map_row_to_account, map_row_to_account_with_offset, update_account,
};
pub use endpoints::{
    AccountForm, create_account_endpoint, delete_account_endpoint, get_account_endpoint,
    list_accounts_endpoint, update_account_endpoint,
};
