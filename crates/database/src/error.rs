use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("An error occurred during JSON serialization/deserialization: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A stored value does not fit the type the nested record needs.
    /// `column` is the bare column name.
    #[error("Malformed value in column '{column}': {reason}")]
    MalformedRow { column: String, reason: String },

}

impl DbError {
    pub(crate) fn malformed(column: impl Into<String>, reason: impl ToString) -> Self {
        DbError::MalformedRow {
            column: column.into(),
            reason: reason.to_string(),
        }
    }

    /// Splits decode failures out of the generic query error so they are
    /// reported as bad data rather than a broken store.
    pub(crate) fn from_query(error: sqlx::Error) -> Self {
        match error {
            // sqlx renders a named index with `{:?}`, quotes included.
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::malformed(index.trim_matches('"'), source)
            }
            sqlx::Error::ColumnNotFound(column) => {
                DbError::malformed(column, "column is missing from the result set")
            }
            other => DbError::QueryError(other),
        }
    }
}
