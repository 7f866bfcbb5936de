//! This module defines the common functionality for listing, sorting and paging data.

use serde::{Deserialize, Serialize};

use crate::Error;

/// SQLite integers are signed 64-bit, so `LIMIT` and `OFFSET` cannot go past this.
const MAX_SQL_INTEGER: u64 = i64::MAX as u64;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page size to use when a request asks for a page without giving a limit.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
        }
    }
}

/// The direction to sort a list in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Sort in order of increasing value.
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    /// Sort in order of decreasing value.
    #[serde(alias = "DESC")]
    Desc,
}

impl SortDirection {
    /// The SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Query parameters shared by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// The maximum number of rows to return. Values of zero or less disable paging.
    pub limit: Option<i64>,
    /// The 1-based page to return, only used together with a limit.
    pub page: Option<u64>,
    /// The field to sort by.
    pub sort_by: Option<String>,
    /// The direction to sort in, ascending if not given.
    pub sort_dir: Option<SortDirection>,
}

impl ListQuery {
    /// Resolve the `ORDER BY` column for this query.
    ///
    /// `columns` maps the public field names accepted in `sortBy` to SQL expressions.
    /// Only names in `columns` are accepted so that user input never reaches the SQL string.
    ///
    /// # Errors
    /// Returns [Error::InvalidSortColumn] if `sortBy` is not one of `columns`.
    pub fn order_by(
        &self,
        columns: &[(&str, &'static str)],
        default: (&'static str, SortDirection),
    ) -> Result<String, Error> {
        let Some(sort_by) = &self.sort_by else {
            return Ok(format!("{} {}", default.0, default.1.as_sql()));
        };

        let column = columns
            .iter()
            .find(|(name, _)| *name == sort_by.as_str())
            .map(|(_, column)| *column)
            .ok_or_else(|| Error::InvalidSortColumn(sort_by.clone()))?;

        let direction = self.sort_dir.unwrap_or_default();

        Ok(format!("{column} {}", direction.as_sql()))
    }

    /// Build the `LIMIT ... OFFSET ...` clause, or an empty string when paging is disabled.
    ///
    /// A page without a limit uses the configured default page size.
    /// Offsets past the largest SQLite integer are clamped, so such pages are simply empty.
    pub fn limit_clause(&self, config: &PaginationConfig) -> String {
        let limit = match (self.limit, self.page) {
            (Some(limit), _) if limit > 0 => limit.unsigned_abs(),
            (Some(_), _) | (None, None) => return String::new(),
            (None, Some(_)) => config.default_page_size.min(MAX_SQL_INTEGER),
        };

        let page = self.page.unwrap_or(1).max(1);
        let offset = (page - 1).saturating_mul(limit).min(MAX_SQL_INTEGER);

        format!("LIMIT {limit} OFFSET {offset}")
    }
}

/// A page of rows together with the total number of rows that matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The number of rows matching the query, ignoring paging.
    pub count: u64,
    /// The rows on the requested page.
    pub rows: Vec<T>,
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        pagination::{ListQuery, PaginationConfig, SortDirection},
    };

    const COLUMNS: [(&str, &str); 2] = [("name", "account.name"), ("id", "account.id")];

    #[test]
    fn uses_default_order_without_sort_by() {
        let query = ListQuery::default();

        let got = query
            .order_by(&COLUMNS, ("account.name", SortDirection::Asc))
            .unwrap();

        assert_eq!(got, "account.name ASC");
    }

    #[test]
    fn maps_sort_by_to_column() {
        let query = ListQuery {
            sort_by: Some("id".to_owned()),
            sort_dir: Some(SortDirection::Desc),
            ..Default::default()
        };

        let got = query
            .order_by(&COLUMNS, ("account.name", SortDirection::Asc))
            .unwrap();

        assert_eq!(got, "account.id DESC");
    }

    #[test]
    fn rejects_unknown_sort_column() {
        let query = ListQuery {
            sort_by: Some("name; DROP TABLE account".to_owned()),
            ..Default::default()
        };

        let got = query.order_by(&COLUMNS, ("account.name", SortDirection::Asc));

        assert_eq!(
            got,
            Err(Error::InvalidSortColumn(
                "name; DROP TABLE account".to_owned()
            ))
        );
    }

    #[test]
    fn no_limit_returns_everything() {
        let query = ListQuery::default();

        assert_eq!(query.limit_clause(&PaginationConfig::default()), "");
    }

    #[test]
    fn non_positive_limit_disables_paging() {
        let query = ListQuery {
            limit: Some(-1),
            page: Some(3),
            ..Default::default()
        };

        assert_eq!(query.limit_clause(&PaginationConfig::default()), "");
    }

    #[test]
    fn page_offsets_by_limit() {
        let query = ListQuery {
            limit: Some(10),
            page: Some(3),
            ..Default::default()
        };

        assert_eq!(
            query.limit_clause(&PaginationConfig::default()),
            "LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn page_without_limit_uses_default_page_size() {
        let query = ListQuery {
            page: Some(2),
            ..Default::default()
        };
        let config = PaginationConfig {
            default_page_size: 5,
        };

        assert_eq!(query.limit_clause(&config), "LIMIT 5 OFFSET 5");
    }

    #[test]
    fn huge_page_offset_is_clamped() {
        let query = ListQuery {
            limit: Some(i64::MAX),
            page: Some(4),
            ..Default::default()
        };

        assert_eq!(
            query.limit_clause(&PaginationConfig::default()),
            format!("LIMIT {0} OFFSET {0}", i64::MAX)
        );
    }

    #[test]
    fn huge_default_page_size_is_clamped() {
        let query = ListQuery {
            page: Some(u64::MAX),
            ..Default::default()
        };
        let config = PaginationConfig {
            default_page_size: u64::MAX,
        };

        assert_eq!(
            query.limit_clause(&config),
            format!("LIMIT {0} OFFSET {0}", i64::MAX)
        );
    }
}
