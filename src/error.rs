use crate::validation::ValidationErrors;

/// Failure of a directory query or mutation.
///
/// Mutations surface every variant as the same generic notice to users, the
/// variant is kept so callers and logs can tell bad input from a failed
/// transaction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("Storage failure: {0}")]
    Storage(#[from] sea_orm::DbErr),
}

impl Error {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
