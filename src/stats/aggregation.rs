//! Folds transactions into per-account and per-user balances.
//!
//! Every function here is pure: the callers fetch the ledger entries from the
//! database and these functions only do the arithmetic.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    account::Account,
    database_id::{AccountId, UserId},
    transaction::TransactionType,
    user::User,
};

/// The part of a transaction needed to compute a balance.
///
/// `subject` is what the amount is attributed to, either an [Account] or a [User].
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry<S> {
    /// The non-negative amount of the transaction.
    pub amount: Decimal,
    /// Whether the amount is added to or subtracted from the balance.
    pub kind: TransactionType,
    /// The account or user the transaction belongs to.
    pub subject: S,
}

impl<S> LedgerEntry<S> {
    /// The amount with the sign of the transaction type applied.
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

/// The running total of an account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountBalance {
    /// Income minus expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// The account the balance belongs to.
    pub account: Account,
}

/// The running total of an individual user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserBalance {
    /// Income minus expenses, including this user's share of shared transactions.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// The user the balance belongs to.
    pub owner: User,
}

/// Account balances keyed by account ID.
pub type AccountBalances = HashMap<AccountId, AccountBalance>;

/// User balances keyed by user ID.
pub type UserBalances = HashMap<UserId, UserBalance>;

/// Sum the signed amounts of `entries` per account.
///
/// Only accounts that appear in `entries` are in the result.
pub fn compute_account_balances(entries: &[LedgerEntry<Account>]) -> AccountBalances {
    let mut balances = AccountBalances::new();

    for entry in entries {
        balances
            .entry(entry.subject.id)
            .or_insert_with(|| AccountBalance {
                amount: Decimal::ZERO,
                account: entry.subject.clone(),
            })
            .amount += entry.signed_amount();
    }

    balances
}

/// Sum the signed amounts of `individual` per user, then split each of the
/// `shared` entries evenly across those users.
///
/// Only users that own at least one individual entry take part in the split.
/// See [compute_user_balances_for] to include users without entries.
pub fn compute_user_balances(
    individual: &[LedgerEntry<User>],
    shared: &[LedgerEntry<User>],
) -> UserBalances {
    compute_user_balances_for(&[], individual, shared)
}

/// Like [compute_user_balances], but every user in `participants` starts at
/// zero and takes part in the split even without individual entries.
///
/// Shared entries are skipped with a warning when nobody is left to split them between.
pub fn compute_user_balances_for(
    participants: &[User],
    individual: &[LedgerEntry<User>],
    shared: &[LedgerEntry<User>],
) -> UserBalances {
    let mut balances: UserBalances = participants
        .iter()
        .map(|user| (user.id, opening_balance(user)))
        .collect();

    for entry in individual {
        balances
            .entry(entry.subject.id)
            .or_insert_with(|| opening_balance(&entry.subject))
            .amount += entry.signed_amount();
    }

    split_shared_entries(shared, &mut balances);

    balances
}

fn opening_balance(user: &User) -> UserBalance {
    UserBalance {
        amount: Decimal::ZERO,
        owner: user.clone(),
    }
}

fn split_shared_entries(shared: &[LedgerEntry<User>], balances: &mut UserBalances) {
    if shared.is_empty() {
        return;
    }

    if balances.is_empty() {
        tracing::warn!(
            "Skipping {} shared transaction(s) since there are no individual users to split them between",
            shared.len()
        );
        return;
    }

    let participant_count = Decimal::from(balances.len());

    for entry in shared {
        let share = entry.kind.signed(entry.amount / participant_count);

        for balance in balances.values_mut() {
            balance.amount += share;
        }
    }
}

/// Merge tag lists into one list without duplicates, sorted lexicographically.
pub fn collect_distinct_tags<'a>(tag_lists: impl IntoIterator<Item = &'a [String]>) -> Vec<String> {
    tag_lists
        .into_iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::{
        account::Account,
        stats::aggregation::{
            LedgerEntry, collect_distinct_tags, compute_account_balances, compute_user_balances,
            compute_user_balances_for,
        },
        transaction::TransactionType,
        user::User,
    };

    fn account(id: i64) -> Account {
        Account {
            id,
            name: format!("Account {id}"),
        }
    }

    fn user(id: i64, shared: bool) -> User {
        User {
            id,
            name: format!("User {id}"),
            email: None,
            shared,
            public: false,
        }
    }

    fn expense<S>(amount: i64, subject: S) -> LedgerEntry<S> {
        LedgerEntry {
            amount: Decimal::from(amount),
            kind: TransactionType::Expense,
            subject,
        }
    }

    fn income<S>(amount: i64, subject: S) -> LedgerEntry<S> {
        LedgerEntry {
            amount: Decimal::from(amount),
            kind: TransactionType::Income,
            subject,
        }
    }

    #[test]
    fn account_balance_is_income_minus_expenses() {
        let entries = [income(100, account(1)), expense(30, account(1))];

        let balances = compute_account_balances(&entries);

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[&1].amount, Decimal::from(70));
        assert_eq!(balances[&1].account, account(1));
    }

    #[test]
    fn only_accounts_with_entries_appear() {
        let entries = [expense(5, account(2)), income(7, account(3))];

        let balances = compute_account_balances(&entries);

        let mut ids: Vec<_> = balances.keys().copied().collect();
        ids.sort();
        assert_eq!(ids, [2, 3]);
        assert_eq!(balances[&2].amount, Decimal::from(-5));
        assert_eq!(balances[&3].amount, Decimal::from(7));
    }

    #[test]
    fn account_balances_ignore_entry_order() {
        let entries = vec![
            income(200, account(1)),
            expense(50, account(1)),
            expense(20, account(2)),
            income(3, account(2)),
        ];
        let mut reversed = entries.clone();
        reversed.reverse();

        let balances = compute_account_balances(&entries);

        assert_eq!(balances, compute_account_balances(&reversed));
        assert_eq!(balances, compute_account_balances(&entries));
        assert_eq!(balances[&1].amount, Decimal::from(150));
        assert_eq!(balances[&2].amount, Decimal::from(-17));
    }

    #[test]
    fn income_only_and_expense_only_totals_are_conserved() {
        let incomes = [income(10, account(1)), income(15, account(1))];
        let expenses = [expense(10, account(1)), expense(15, account(1))];

        assert_eq!(compute_account_balances(&incomes)[&1].amount, Decimal::from(25));
        assert_eq!(compute_account_balances(&expenses)[&1].amount, Decimal::from(-25));
    }

    #[test]
    fn individual_expense_only_affects_its_owner() {
        let individual = [expense(100, user(1, false))];

        let balances = compute_user_balances(&individual, &[]);

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[&1].amount, Decimal::from(-100));
    }

    #[test]
    fn user_balances_ignore_entry_order() {
        let individual = vec![expense(10, user(1, false)), income(5, user(2, false))];
        let shared = vec![expense(30, user(9, true)), income(12, user(9, true))];
        let mut reversed_individual = individual.clone();
        reversed_individual.reverse();
        let mut reversed_shared = shared.clone();
        reversed_shared.reverse();

        assert_eq!(
            compute_user_balances(&individual, &shared),
            compute_user_balances(&reversed_individual, &reversed_shared)
        );
    }

    #[test]
    fn no_entries_give_no_balances() {
        assert!(compute_account_balances(&[]).is_empty());
        assert!(compute_user_balances(&[], &[]).is_empty());
    }

    #[test]
    fn shared_expense_is_split_evenly() {
        let individual = [expense(0, user(1, false)), expense(0, user(2, false))];
        let shared = [expense(50, user(9, true))];

        let balances = compute_user_balances(&individual, &shared);

        assert_eq!(balances[&1].amount, Decimal::from(-25));
        assert_eq!(balances[&2].amount, Decimal::from(-25));
        assert!(!balances.contains_key(&9));
    }

    #[test]
    fn shared_income_is_added_to_every_user() {
        let individual = [expense(10, user(1, false)), income(40, user(2, false))];
        let shared = [income(20, user(9, true))];

        let balances = compute_user_balances(&individual, &shared);

        assert_eq!(balances[&1].amount, Decimal::from(0));
        assert_eq!(balances[&2].amount, Decimal::from(50));
    }

    #[test]
    fn shared_entries_sum_back_to_their_total() {
        let individual = [
            income(1, user(1, false)),
            income(1, user(2, false)),
            income(1, user(3, false)),
        ];
        let shared = [expense(100, user(9, true))];

        let balances = compute_user_balances(&individual, &shared);

        let total_share: Decimal = balances
            .values()
            .map(|balance| balance.amount - Decimal::ONE)
            .sum();
        let tolerance = Decimal::new(1, 20);
        assert!(
            (total_share + Decimal::ONE_HUNDRED).abs() < tolerance,
            "shares sum to {total_share}, want -100"
        );
    }

    #[test]
    fn shared_entries_without_participants_are_skipped() {
        let shared = [expense(50, user(9, true))];

        let balances = compute_user_balances(&[], &shared);

        assert!(balances.is_empty());
    }

    #[test]
    fn pre_seeded_participants_share_income() {
        let participants = [user(1, false), user(2, false)];
        let shared = [income(50, user(9, true))];

        let balances = compute_user_balances_for(&participants, &[], &shared);

        assert_eq!(balances[&1].amount, Decimal::from(25));
        assert_eq!(balances[&2].amount, Decimal::from(25));
    }

    #[test]
    fn participants_without_entries_share_the_split() {
        let participants = [user(1, false), user(2, false)];
        let individual = [expense(10, user(1, false))];
        let shared = [expense(50, user(9, true))];

        let balances = compute_user_balances_for(&participants, &individual, &shared);

        assert_eq!(balances[&1].amount, Decimal::from(-35));
        assert_eq!(balances[&2].amount, Decimal::from(-25));
    }

    #[test]
    fn without_participants_only_users_with_entries_share() {
        let individual = [expense(10, user(1, false))];
        let shared = [expense(50, user(9, true))];

        let balances = compute_user_balances(&individual, &shared);

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[&1].amount, Decimal::from(-60));
    }

    #[test]
    fn tags_are_distinct_and_sorted() {
        let tag_lists = [
            vec!["a".to_owned(), "b".to_owned()],
            vec!["b".to_owned()],
            vec!["c".to_owned(), "a".to_owned()],
        ];

        let got = collect_distinct_tags(tag_lists.iter().map(Vec::as_slice));

        assert_eq!(got, ["a", "b", "c"]);
    }

    #[test]
    fn no_tags_give_an_empty_list() {
        let tag_lists: [Vec<String>; 2] = [vec![], vec![]];

        let got = collect_distinct_tags(tag_lists.iter().map(Vec::as_slice));

        assert!(got.is_empty());
    }
}
