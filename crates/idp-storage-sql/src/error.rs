//! SQL storage error mapping.

use idp_storage::StorageError;
use sqlx::Error as SqlxError;

/// Converts a `SQLx` error to a storage error.
///
/// Pool-level failures map to `Connection` and database-side rejections to
/// `Query`, so callers can tell "backend unreachable" from "bad statement";
/// neither is ever collapsed into a not-found.
#[allow(clippy::needless_pass_by_value)]
pub fn from_sqlx_error(err: SqlxError) -> StorageError {
    match err {
        SqlxError::RowNotFound => {
            // Callers use fetch_optional for lookups; reaching this means a
            // statement that should always return a row did not.
            StorageError::Internal("row not found".to_string())
        }
        SqlxError::Database(db_err) => StorageError::Query(db_err.to_string()),
        SqlxError::PoolTimedOut => {
            StorageError::Connection("connection pool timeout".to_string())
        }
        SqlxError::PoolClosed => StorageError::Connection("connection pool closed".to_string()),
        SqlxError::Io(io_err) => StorageError::Connection(io_err.to_string()),
        _ => StorageError::Internal(err.to_string()),
    }
}
