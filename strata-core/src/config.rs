//! Migrator configuration.

use serde::{Deserialize, Serialize};

/// What `create_schema_for_tenant` does when the schema already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingSchema {
    /// Idempotent create: re-run migration into the existing schema.
    #[default]
    Reuse,
    /// Fail with [`TenancyError::SchemaExists`](crate::TenancyError::SchemaExists).
    Error,
}

/// What `drop_schema_for_tenant` does when the schema does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSchema {
    /// Treat the drop as a no-op.
    #[default]
    Ignore,
    /// Fail with [`TenancyError::SchemaNotFound`](crate::TenancyError::SchemaNotFound).
    Error,
}

/// Behavior switches for the schema migrator.
///
/// Defaults favor idempotency: duplicate creates re-migrate in place and
/// missing drops are no-ops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenancyConfig {
    /// Duplicate-create policy.
    #[serde(default)]
    pub on_existing: ExistingSchema,

    /// Missing-drop policy.
    #[serde(default)]
    pub on_missing: MissingSchema,
}

impl TenancyConfig {
    /// Configuration with the idempotent defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duplicate-create policy.
    pub fn with_on_existing(mut self, policy: ExistingSchema) -> Self {
        self.on_existing = policy;
        self
    }

    /// Set the missing-drop policy.
    pub fn with_on_missing(mut self, policy: MissingSchema) -> Self {
        self.on_missing = policy;
        self
    }

    /// Strict configuration: duplicates and missing schemas are errors.
    pub fn strict() -> Self {
        Self {
            on_existing: ExistingSchema::Error,
            on_missing: MissingSchema::Error,
        }
    }
}
