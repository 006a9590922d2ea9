//! Result cardinality rules shared by the backends
//!
//! Every statement falls in one of four shapes: exactly one row, zero or one
//! row, many rows, or no rows (a write). Lookups fetch all matching rows and
//! let these helpers enforce the shape, so a duplicated key surfaces as
//! [`ShopError::MultipleRows`] instead of silently picking a row.

use crate::core::error::{ShopError, ShopResult};

/// Exactly one row; zero is `NotFound`, more is `MultipleRows`.
pub fn exactly_one<T>(
    mut rows: Vec<T>,
    resource: &'static str,
    key: impl ToString,
) -> ShopResult<T> {
    match rows.len() {
        0 => Err(ShopError::not_found(resource, key)),
        1 => Ok(rows.remove(0)),
        count => Err(ShopError::MultipleRows { resource, count }),
    }
}

/// Zero or one row; more is `MultipleRows`.
pub fn zero_or_one<T>(mut rows: Vec<T>, resource: &'static str) -> ShopResult<Option<T>> {
    match rows.len() {
        0 => Ok(None),
        1 => Ok(Some(rows.remove(0))),
        count => Err(ShopError::MultipleRows { resource, count }),
    }
}

/// A write that must have touched at least one row
pub fn affected(rows_affected: u64, resource: &'static str, key: impl ToString) -> ShopResult<()> {
    if rows_affected == 0 {
        Err(ShopError::not_found(resource, key))
    } else {
        Ok(())
    }
}

/// Classify a sqlx failure into the shop taxonomy.
///
/// Integrity failures (unique, foreign key, not-null, check) become
/// `ConstraintViolation`, `RowNotFound` is `NotFound`, and everything else
/// is a `Storage` error.
#[cfg(feature = "postgres")]
pub fn map_sqlx_error(err: sqlx::Error) -> ShopError {
    use sqlx::error::ErrorKind;

    match &err {
        sqlx::Error::Database(db) => match db.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => ShopError::ConstraintViolation {
                message: db.message().to_string(),
                constraint: db.constraint().map(str::to_string),
            },
            _ => ShopError::storage(format!("PostgreSQL query error: {}", db.message())),
        },
        sqlx::Error::RowNotFound => ShopError::not_found("row", "query"),
        sqlx::Error::PoolTimedOut => ShopError::storage("timed out acquiring a connection"),
        other => ShopError::storage(other.to_string()),
    }
}
