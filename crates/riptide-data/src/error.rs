//! Error types for the data access layer.

use std::error::Error;

use thiserror::Error;

/// Result alias for data layer operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors raised by the data access layer.
#[derive(Debug, Error)]
pub enum DataError {
    /// Migration execution failed.
    #[error("migration failed")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    /// A database operation failed.
    #[error("database operation failed: {operation}")]
    Query {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying SQL error.
        #[source]
        source: sqlx::Error,
    },
    /// A stored value could not be decoded into its domain type.
    #[error("stored value could not be decoded: {context}")]
    Decode {
        /// Field or column that held the invalid value.
        context: &'static str,
        /// Underlying decode failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl From<sqlx::Error> for DataError {
    fn from(source: sqlx::Error) -> Self {
        Self::Query {
            operation: "row decode",
            source,
        }
    }
}

/// Attribute an sqlx failure to a named store operation.
pub(crate) fn op(operation: &'static str) -> impl FnOnce(sqlx::Error) -> DataError {
    move |source| DataError::Query { operation, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_names_the_operation() {
        let err = op("insert download")(sqlx::Error::RowNotFound);
        assert_eq!(
            err.to_string(),
            "database operation failed: insert download"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn sqlx_errors_convert_to_row_decode() {
        let err = DataError::from(sqlx::Error::RowNotFound);
        assert!(err.to_string().contains("row decode"));
    }
}
