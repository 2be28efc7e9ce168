pub mod entities;
pub mod movie_repo;
pub mod review_repo;
pub mod user_repo;

use sea_orm::{DbErr, SqlErr};

/// Store-level failure. Unique-constraint rejections are split out so the
/// domain layer can report them as conflicts; losers of a concurrent
/// duplicate write land here instead of in the application pre-checks.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub(crate) fn classify(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::UniqueViolation(detail),
        _ => StoreError::Db(err),
    }
}
