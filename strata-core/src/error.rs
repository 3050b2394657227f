//! Error types for the tenancy layer.

use thiserror::Error;

/// Errors that can occur in the tenancy layer.
#[derive(Error, Debug)]
pub enum TenancyError {
    /// Bad model registration (missing table name, unregistrable entity).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A model's declared name does not match its classification's naming
    /// convention, or a schema identifier is not a legal name.
    #[error("naming convention violation: {0}")]
    NamingConvention(String),

    /// DDL execution failed while migrating a schema.
    ///
    /// Migration statements are idempotent (`IF NOT EXISTS`), so the
    /// recovery path is to re-run the failed operation.
    #[error("migration failed: {0}")]
    Migration(String),

    /// The named schema does not exist.
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    /// The named schema already exists and the migrator is configured to
    /// treat duplicates as an error.
    #[error("schema already exists: {0}")]
    SchemaExists(String),

    /// No tenant could be resolved for a non-skipped request, or the
    /// resolved candidate failed validation.
    #[error("tenant resolution failed: {0}")]
    TenantResolution(String),

    /// The resolved tenant exists but is deactivated.
    #[error("tenant is inactive: {0}")]
    Inactive(String),

    /// Database error from SeaORM.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Result type alias for tenancy operations.
pub type TenancyResult<T> = Result<T, TenancyError>;
