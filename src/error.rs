//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Serialize;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A transaction amount was below zero.
    ///
    /// Whether money was spent or earned is recorded by the transaction type,
    /// so amounts are always stored as non-negative values.
    #[error("the amount {0} is negative, use the transaction type for expenses")]
    NegativeAmount(Decimal),

    /// A transaction amount is too large to be stored.
    #[error("the amount {0} is too large")]
    AmountOutOfRange(Decimal),

    /// A transaction tag contains a comma.
    #[error("the tag \"{0}\" contains a comma, send separate tags as separate list items")]
    InvalidTag(String),

    /// The account or user referenced by a transaction does not exist.
    #[error("the account or user referenced by the transaction does not exist")]
    InvalidReference,

    /// A user marked as public did not provide an email address.
    #[error("public users require an email address")]
    MissingEmail,

    /// The `search` query parameter could not be parsed.
    #[error("invalid search filter: {0}")]
    InvalidSearch(String),

    /// The `sortBy` query parameter names a column that cannot be sorted on.
    #[error("cannot sort by \"{0}\"")]
    InvalidSortColumn(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The specified account name already exists in the database.
    #[error("the account \"{0}\" already exists in the database")]
    DuplicateAccountName(String),

    /// The specified user name already exists in the database.
    #[error("the user \"{0}\" already exists in the database")]
    DuplicateUserName(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete an account that does not exist
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// Tried to update an account that does not exist
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,

    /// Tried to delete a user that does not exist
    #[error("tried to delete a user that is not in the database")]
    DeleteMissingUser,

    /// Tried to update a user that does not exist
    #[error("tried to update a user that is not in the database")]
    UpdateMissingUser,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
pub struct ErrorMessage {
    /// A description of what went wrong.
    pub message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status_code, message) = match self {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                "The resource with the given ID was not found.".to_owned(),
            ),
            Error::UpdateMissingAccount | Error::DeleteMissingAccount => (
                StatusCode::NOT_FOUND,
                "The account with the given ID was not found.".to_owned(),
            ),
            Error::UpdateMissingUser | Error::DeleteMissingUser => (
                StatusCode::NOT_FOUND,
                "The user with the given ID was not found.".to_owned(),
            ),
            Error::UpdateMissingTransaction | Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                "The transaction with the given ID was not found.".to_owned(),
            ),
            Error::DuplicateAccountName(_) | Error::DuplicateUserName(_) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            Error::TooWeak(_)
            | Error::NegativeAmount(_)
            | Error::AmountOutOfRange(_)
            | Error::InvalidTag(_)
            | Error::InvalidReference
            | Error::MissingEmail
            | Error::InvalidSearch(_)
            | Error::InvalidSortColumn(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                )
            }
        };

        (status_code, Json(ErrorMessage { message })).into_response()
    }
}
