#![allow(missing_docs)]

use axum_test::TestServer;
use rusqlite::Connection;

use crate::{
    AppState, PasswordHash, build_router,
    account::{Account, create_account},
    db::initialize,
    pagination::PaginationConfig,
    user::{User, UserDetails, create_user},
};

/// The lowest cost bcrypt accepts, keeps the tests fast.
pub(crate) const TEST_HASH_COST: u32 = 4;

pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");
    connection
}

pub(crate) fn get_test_server() -> TestServer {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    let mut state = AppState::new(connection, PaginationConfig::default())
        .expect("Could not create app state.");
    state.password_hash_cost = TEST_HASH_COST;

    TestServer::new(build_router(state))
}

#[track_caller]
pub(crate) fn must_create_account(name: &str, connection: &Connection) -> Account {
    create_account(name, connection).expect("Could not create account")
}

#[track_caller]
pub(crate) fn must_create_user(name: &str, shared: bool, connection: &Connection) -> User {
    let details = UserDetails {
        name: name.to_owned(),
        email: None,
        shared,
        public: false,
    };

    create_user(
        details,
        &PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create user")
}
