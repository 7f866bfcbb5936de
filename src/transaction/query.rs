//! Searching, sorting and paging transactions.

use rusqlite::{Connection, params_from_iter, types::Value};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    database_id::{AccountId, UserId},
    db::query_count,
    money::to_cents,
    pagination::{ListQuery, Page, PaginationConfig, SortDirection},
    transaction::core::{
        POPULATED_FROM, PopulatedTransaction, REFERENCE_COLUMNS, TRANSACTION_COLUMNS,
        TransactionType, map_populated_transaction_row, split_tags,
    },
};

/// The columns a transaction list can be sorted by.
///
/// `account` and `user` sort by the name of the referenced row.
const SORT_COLUMNS: [(&str, &str); 10] = [
    ("id", "\"transaction\".id"),
    ("amount", "\"transaction\".amount_cents"),
    ("description", "\"transaction\".description"),
    ("date", "\"transaction\".date"),
    ("tags", "\"transaction\".tags"),
    ("type", "\"transaction\".type"),
    ("accountId", "\"transaction\".account_id"),
    ("userId", "\"transaction\".user_id"),
    ("account", "account.name"),
    ("user", "user.name"),
];

/// Filters for a transaction list. Every given filter must match.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSearch {
    /// Only transactions recorded against this account.
    pub account_id: Option<AccountId>,
    /// Only transactions owned by this user.
    pub user_id: Option<UserId>,
    /// Only transactions of at least this amount.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    /// Only transactions whose description contains this text.
    pub description: Option<String>,
    /// Only transactions with a tag containing any of these strings.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Only income or only expenses.
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    /// Only transactions on or after this date.
    pub date: Option<Date>,
}

impl TransactionSearch {
    /// Parse the JSON encoded `search` query parameter.
    ///
    /// # Errors
    /// Returns [Error::InvalidSearch] if `raw_search` is not a valid search object.
    pub fn from_json(raw_search: &str) -> Result<Self, Error> {
        serde_json::from_str(raw_search).map_err(|error| Error::InvalidSearch(error.to_string()))
    }

    /// Build the `WHERE` clause and its positional parameters.
    fn where_clause(&self) -> Result<(String, Vec<Value>), Error> {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(account_id) = self.account_id {
            conditions.push("\"transaction\".account_id = ?".to_owned());
            params.push(Value::Integer(account_id));
        }

        if let Some(user_id) = self.user_id {
            conditions.push("\"transaction\".user_id = ?".to_owned());
            params.push(Value::Integer(user_id));
        }

        if let Some(amount) = self.amount {
            conditions.push("\"transaction\".amount_cents >= ?".to_owned());
            params.push(Value::Integer(to_cents(amount)?));
        }

        if let Some(description) = &self.description {
            conditions.push("\"transaction\".description LIKE ?".to_owned());
            params.push(Value::Text(format!("%{description}%")));
        }

        let tags: Vec<&str> = self
            .tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .collect();
        if !tags.is_empty() {
            let any_tag = vec!["\"transaction\".tags LIKE ?"; tags.len()].join(" OR ");
            conditions.push(format!("({any_tag})"));
            params.extend(tags.iter().map(|tag| Value::Text(format!("%{tag}%"))));
        }

        if let Some(kind) = self.kind {
            conditions.push("\"transaction\".type = ?".to_owned());
            params.push(Value::Text(kind.as_str().to_owned()));
        }

        if let Some(date) = self.date {
            conditions.push("\"transaction\".date >= ?".to_owned());
            params.push(Value::Text(date.to_string()));
        }

        if conditions.is_empty() {
            return Ok((String::new(), params));
        }

        Ok((format!("WHERE {}", conditions.join(" AND ")), params))
    }
}

/// Retrieve a page of transactions matching `search`, newest first unless the
/// query says otherwise.
///
/// When `populate` is false the account and user are left off each row.
///
/// # Errors
/// Returns an [Error::InvalidSortColumn] for an unknown `sortBy` field or an
/// [Error::SqlError] if the query fails.
pub fn list_transactions(
    query: &ListQuery,
    search: &TransactionSearch,
    populate: bool,
    pagination_config: &PaginationConfig,
    connection: &Connection,
) -> Result<Page<PopulatedTransaction>, Error> {
    let order_by = query.order_by(&SORT_COLUMNS, ("\"transaction\".date", SortDirection::Desc))?;
    let limit = query.limit_clause(pagination_config);
    let (where_clause, params) = search.where_clause()?;

    let count = query_count(
        &format!("SELECT COUNT(\"transaction\".id) {POPULATED_FROM} {where_clause}"),
        params_from_iter(params.iter()),
        connection,
    )?;

    let rows = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS}, {REFERENCE_COLUMNS} {POPULATED_FROM} {where_clause} \
            ORDER BY {order_by}, \"transaction\".id ASC {limit}"
        ))?
        .query_map(params_from_iter(params.iter()), map_populated_transaction_row)?
        .map(|maybe_transaction| {
            maybe_transaction
                .map(|transaction| {
                    if populate {
                        transaction
                    } else {
                        transaction.unpopulated()
                    }
                })
                .map_err(Error::from)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page { count, rows })
}

/// Get the tag list of every transaction.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_transaction_tags(connection: &Connection) -> Result<Vec<Vec<String>>, Error> {
    connection
        .prepare("SELECT tags FROM \"transaction\"")?
        .query_map([], |row| row.get::<_, String>(0))?
        .map(|maybe_tags| {
            maybe_tags
                .map(|raw_tags| split_tags(&raw_tags))
                .map_err(Error::from)
        })
        .collect()
}
