//! Route handlers for account and user balances.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    stats::{
        aggregation::{
            AccountBalances, UserBalances, compute_account_balances, compute_user_balances,
        },
        db::{get_account_ledger, get_user_ledger},
    },
};

/// The state needed to compute balances.
#[derive(Debug, Clone)]
pub struct StatsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for StatsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for the balance of every account with transactions.
pub async fn get_account_stats_endpoint(
    State(state): State<StatsState>,
) -> Result<Json<AccountBalances>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let entries = get_account_ledger(&connection)?;

    Ok(Json(compute_account_balances(&entries)))
}

/// A route handler for the balance of every individual user with
/// transactions, including their share of the shared users' transactions.
pub async fn get_user_stats_endpoint(
    State(state): State<StatsState>,
) -> Result<Json<UserBalances>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let individual = get_user_ledger(false, &connection)?;
    let shared = get_user_ledger(true, &connection)?;

    Ok(Json(compute_user_balances(&individual, &shared)))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{endpoints, test_utils::get_test_server};

    const PASSWORD: &str = "iamtestingwhethericancreateanewuser";

    async fn create(server: &TestServer, uri: &str, body: Value) -> i64 {
        let response = server.post(uri).json(&body).await;
        response.assert_status_ok();
        response.json::<Value>()["id"]
            .as_i64()
            .expect("response has an id")
    }

    async fn create_transaction(
        server: &TestServer,
        amount: f64,
        kind: &str,
        account_id: i64,
        user_id: i64,
    ) {
        create(
            server,
            endpoints::TRANSACTIONS,
            json!({ "amount": amount, "type": kind, "accountId": account_id, "userId": user_id }),
        )
        .await;
    }

    #[tokio::test]
    async fn account_stats_are_keyed_by_account_id() {
        let server = get_test_server();
        let checking = create(&server, endpoints::ACCOUNTS, json!({ "name": "Checking" })).await;
        let savings = create(&server, endpoints::ACCOUNTS, json!({ "name": "Savings" })).await;
        let alice = create(
            &server,
            endpoints::USERS,
            json!({ "name": "Alice", "password": PASSWORD }),
        )
        .await;
        create_transaction(&server, 100.0, "income", checking, alice).await;
        create_transaction(&server, 30.0, "expense", checking, alice).await;
        create_transaction(&server, 12.5, "expense", savings, alice).await;

        let response = server.get(endpoints::ACCOUNT_STATS).await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body[checking.to_string()]["amount"], json!(70.0));
        assert_eq!(body[checking.to_string()]["account"]["name"], "Checking");
        assert_eq!(body[savings.to_string()]["amount"], json!(-12.5));
    }

    #[tokio::test]
    async fn account_stats_are_empty_without_transactions() {
        let server = get_test_server();
        create(&server, endpoints::ACCOUNTS, json!({ "name": "Checking" })).await;

        let body = server.get(endpoints::ACCOUNT_STATS).await.json::<Value>();

        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn user_stats_split_shared_transactions() {
        let server = get_test_server();
        let account = create(&server, endpoints::ACCOUNTS, json!({ "name": "Joint" })).await;
        let alice = create(
            &server,
            endpoints::USERS,
            json!({ "name": "Alice", "password": PASSWORD }),
        )
        .await;
        let bob = create(
            &server,
            endpoints::USERS,
            json!({ "name": "Bob", "password": PASSWORD }),
        )
        .await;
        let household = create(
            &server,
            endpoints::USERS,
            json!({ "name": "Household", "all": true, "password": PASSWORD }),
        )
        .await;
        create_transaction(&server, 10.0, "expense", account, alice).await;
        create_transaction(&server, 20.0, "income", account, bob).await;
        create_transaction(&server, 50.0, "expense", account, household).await;

        let response = server.get(endpoints::USER_STATS).await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body[alice.to_string()]["amount"], json!(-35.0));
        assert_eq!(body[bob.to_string()]["amount"], json!(-5.0));
        assert_eq!(body[alice.to_string()]["owner"]["name"], "Alice");
        assert!(body.get(household.to_string()).is_none());
    }

    #[tokio::test]
    async fn user_stats_skip_shared_transactions_without_individuals() {
        let server = get_test_server();
        let account = create(&server, endpoints::ACCOUNTS, json!({ "name": "Joint" })).await;
        let household = create(
            &server,
            endpoints::USERS,
            json!({ "name": "Household", "all": true, "password": PASSWORD }),
        )
        .await;
        create_transaction(&server, 50.0, "expense", account, household).await;

        let response = server.get(endpoints::USER_STATS).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!({}));
    }
}
