//! Reads the ledger entries that the balance computations fold over.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    account::{Account, map_row_to_account_with_offset},
    money::from_cents,
    stats::aggregation::LedgerEntry,
    user::{User, map_row_to_user_with_offset},
};

/// Get every transaction as an entry against its account.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_account_ledger(connection: &Connection) -> Result<Vec<LedgerEntry<Account>>, Error> {
    connection
        .prepare(
            "SELECT \"transaction\".amount_cents, \"transaction\".type, account.id, account.name
            FROM \"transaction\"
            INNER JOIN account ON \"transaction\".account_id = account.id",
        )?
        .query_map([], |row| {
            map_row_to_ledger_entry(row, map_row_to_account_with_offset)
        })?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

/// Get the transactions of either shared or individual users as entries
/// against their owner.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_user_ledger(
    shared: bool,
    connection: &Connection,
) -> Result<Vec<LedgerEntry<User>>, Error> {
    connection
        .prepare(
            "SELECT \"transaction\".amount_cents, \"transaction\".type,
                user.id, user.name, user.email, user.is_shared, user.is_public
            FROM \"transaction\"
            INNER JOIN user ON \"transaction\".user_id = user.id
            WHERE user.is_shared = ?1",
        )?
        .query_map([shared], |row| {
            map_row_to_ledger_entry(row, map_row_to_user_with_offset)
        })?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

/// Map a row of `amount_cents, type` followed by the subject's columns.
fn map_row_to_ledger_entry<S>(
    row: &Row,
    map_subject: impl Fn(&Row, usize) -> Result<S, rusqlite::Error>,
) -> Result<LedgerEntry<S>, rusqlite::Error> {
    let amount_cents = row.get(0)?;

    Ok(LedgerEntry {
        amount: from_cents(amount_cents),
        kind: row.get(1)?,
        subject: map_subject(row, 2)?,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::{
        stats::db::{get_account_ledger, get_user_ledger},
        test_utils::{get_test_connection, must_create_account, must_create_user},
        transaction::{Transaction, TransactionType, create_transaction},
    };

    #[test]
    fn user_ledger_is_split_by_shared_flag() {
        let conn = get_test_connection();
        let account = must_create_account("Joint", &conn);
        let alice = must_create_user("Alice", false, &conn);
        let household = must_create_user("Household", true, &conn);
        create_transaction(
            Transaction::build(Decimal::new(1_050, 2), account.id, alice.id),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(Decimal::ONE_HUNDRED, account.id, household.id)
                .kind(TransactionType::Income),
            &conn,
        )
        .unwrap();

        let individual = get_user_ledger(false, &conn).unwrap();
        let shared = get_user_ledger(true, &conn).unwrap();

        assert_eq!(individual.len(), 1);
        assert_eq!(individual[0].subject, alice);
        assert_eq!(individual[0].amount, Decimal::new(1_050, 2));
        assert_eq!(individual[0].kind, TransactionType::Expense);
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].subject, household);
    }

    #[test]
    fn account_ledger_has_every_transaction() {
        let conn = get_test_connection();
        let account = must_create_account("Joint", &conn);
        let alice = must_create_user("Alice", false, &conn);
        let household = must_create_user("Household", true, &conn);
        for user_id in [alice.id, household.id] {
            create_transaction(Transaction::build(Decimal::ONE, account.id, user_id), &conn)
                .unwrap();
        }

        let entries = get_account_ledger(&conn).unwrap();

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|entry| entry.subject == account));
    }
}
