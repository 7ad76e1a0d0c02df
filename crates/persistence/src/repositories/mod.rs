//! Repository implementations for database operations.
//!
//! Each repository implements the matching domain store trait.

pub mod account;
pub mod demand;
pub mod resource;

pub use account::AccountRepository;
pub use demand::DemandRepository;
pub use resource::ResourceRepository;

use domain::errors::StoreError;

/// Maps a sqlx error onto the domain store error.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some("23505") => {
            StoreError::Conflict(db_err.message().to_string())
        }
        other => {
            tracing::error!(error = %other, "Database error");
            StoreError::Backend(other.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert_eq!(store_error(sqlx::Error::RowNotFound), StoreError::NotFound);
    }

    #[test]
    fn test_other_errors_map_to_backend() {
        let err = store_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
