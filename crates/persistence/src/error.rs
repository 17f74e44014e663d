use domain::DomainError;
use thiserror::Error;

use crate::reconciler::ReconcilePhase;

/// Errors that can occur when reading or writing persisted entities.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No entity with this id is stored.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A listing found no entities at all.
    #[error("{entity}s not found")]
    NoneFound { entity: &'static str },

    /// An entity with this id is already stored.
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Stored data no longer satisfies the entity's invariants.
    #[error("Invalid stored record: {0}")]
    InvalidRecord(#[from] DomainError),

    /// One phase of an item reconciliation failed. Earlier phases stay applied.
    #[error("Reconciling order items failed during {phase}: {source}")]
    Reconcile {
        phase: ReconcilePhase,
        #[source]
        source: Box<RepositoryError>,
    },

    /// A value does not fit the range of its column or of the entity field.
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl RepositoryError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn already_exists(entity: &'static str, id: impl ToString) -> Self {
        Self::AlreadyExists {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid(err: impl Into<DomainError>) -> Self {
        Self::InvalidRecord(err.into())
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
