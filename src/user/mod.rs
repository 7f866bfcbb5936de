//! Users that own transactions, including shared users whose transactions are split.

mod core;
mod endpoints;

pub use core::{
    User, UserDetails, count_users, create_user, create_user_table, delete_user,
    get_password_hash, get_user, get_user_by_name, list_users, map_row_to_user,
    map_row_to_user_with_offset, update_password, update_user,
};
pub use endpoints::{
    UserForm, create_user_endpoint, delete_user_endpoint, get_user_endpoint, list_users_endpoint,
    update_user_endpoint,
};
