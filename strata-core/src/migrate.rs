//! Schema migration.
//!
//! The migrator partitions DDL by model class: public tables are only ever
//! created under the shared schema, tenant tables only ever under a named
//! tenant schema. Every operation runs inside one transaction on a single
//! pooled session; on PostgreSQL (the supported engine family) DDL is
//! transactional, so a failed operation rolls back cleanly. Statements are
//! idempotent (`IF NOT EXISTS`), so re-running a failed operation is always
//! safe.
//!
//! # Usage
//!
//! ```rust,ignore
//! use strata_core::{ModelRegistry, SchemaMigrator};
//!
//! let registry = Arc::new(ModelRegistry::new());
//! registry.register::<tenants::Entity>()?;
//! registry.register::<books::Entity>()?;
//!
//! let migrator = SchemaMigrator::new(db, registry);
//! migrator.migrate_public_schema().await?;
//! migrator.create_schema_for_tenant("acme").await?;
//! ```

use crate::config::{ExistingSchema, MissingSchema, TenancyConfig};
use crate::error::{TenancyError, TenancyResult};
use crate::model::{validate_schema_name, SchemaClass};
use crate::registry::ModelRegistry;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement, TransactionTrait};
use std::sync::Arc;
use tracing::{debug, info};

/// Creates, populates, and drops schemas from the registered model set.
pub struct SchemaMigrator {
    db: DatabaseConnection,
    registry: Arc<ModelRegistry>,
    config: TenancyConfig,
}

impl SchemaMigrator {
    /// Create a migrator over `db` with the idempotent default config.
    pub fn new(db: DatabaseConnection, registry: Arc<ModelRegistry>) -> Self {
        Self {
            db,
            registry,
            config: TenancyConfig::default(),
        }
    }

    /// Replace the migrator's configuration.
    pub fn with_config(mut self, config: TenancyConfig) -> Self {
        self.config = config;
        self
    }

    /// The registry this migrator reads from.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    fn backend(&self) -> TenancyResult<DbBackend> {
        match self.db.get_database_backend() {
            DbBackend::Postgres => Ok(DbBackend::Postgres),
            other => Err(TenancyError::Migration(format!(
                "schema-per-tenant requires PostgreSQL, connected backend is {other:?}"
            ))),
        }
    }

    /// Ensure the shared schema exists and migrate every public model into it.
    ///
    /// Idempotent: tables already in shape are left untouched.
    pub async fn migrate_public_schema(&self) -> TenancyResult<()> {
        let backend = self.backend()?;
        let shared = self.registry.public_schema();
        validate_schema_name(shared)?;

        let descriptors = self.registry.descriptors(SchemaClass::Public);
        info!(schema = shared, tables = descriptors.len(), "migrating public schema");

        let txn = self.db.begin().await?;
        txn.execute_raw(Statement::from_string(
            backend,
            format!("CREATE SCHEMA IF NOT EXISTS \"{shared}\""),
        ))
        .await
        .map_err(|e| TenancyError::Migration(format!("create schema {shared}: {e}")))?;

        for desc in &descriptors {
            debug!(table = %desc.qualified_name(), "creating public table");
            txn.execute_raw(backend.build(&desc.create_statement(backend)))
                .await
                .map_err(|e| {
                    TenancyError::Migration(format!(
                        "create table {}: {e}",
                        desc.qualified_name()
                    ))
                })?;
        }
        txn.commit().await?;
        Ok(())
    }

    /// Create `schema` if absent and migrate every tenant model into it.
    ///
    /// The tenant tables are created unqualified with the transaction's
    /// search path pinned to `schema`, so they can only land there. With
    /// [`ExistingSchema::Error`] configured, an already-existing schema is a
    /// [`TenancyError::SchemaExists`] conflict; the default re-migrates in
    /// place.
    pub async fn create_schema_for_tenant(&self, schema: &str) -> TenancyResult<()> {
        let backend = self.backend()?;
        self.check_tenant_schema_name(schema)?;

        if self.config.on_existing == ExistingSchema::Error && self.schema_exists(schema).await? {
            return Err(TenancyError::SchemaExists(schema.to_string()));
        }

        let descriptors = self.registry.descriptors(SchemaClass::Tenant);
        info!(schema, tables = descriptors.len(), "creating tenant schema");

        let txn = self.db.begin().await?;
        txn.execute_raw(Statement::from_string(
            backend,
            format!("CREATE SCHEMA IF NOT EXISTS \"{schema}\""),
        ))
        .await
        .map_err(|e| TenancyError::Migration(format!("create schema {schema}: {e}")))?;

        // Scopes the unqualified CREATE TABLEs below; dies with the txn.
        txn.execute_raw(Statement::from_string(
            backend,
            format!("SET LOCAL search_path TO \"{schema}\""),
        ))
        .await
        .map_err(|e| TenancyError::Migration(format!("set search_path {schema}: {e}")))?;

        for desc in &descriptors {
            debug!(schema, table = desc.table(), "creating tenant table");
            txn.execute_raw(backend.build(&desc.create_statement(backend)))
                .await
                .map_err(|e| {
                    TenancyError::Migration(format!(
                        "create table {}.{}: {e}",
                        schema,
                        desc.table()
                    ))
                })?;
        }
        txn.commit().await?;
        Ok(())
    }

    /// Drop `schema` and everything it contains.
    ///
    /// Irreversible. With [`MissingSchema::Error`] configured, a missing
    /// schema is a [`TenancyError::SchemaNotFound`]; the default is a no-op.
    pub async fn drop_schema_for_tenant(&self, schema: &str) -> TenancyResult<()> {
        let backend = self.backend()?;
        self.check_tenant_schema_name(schema)?;

        if self.config.on_missing == MissingSchema::Error && !self.schema_exists(schema).await? {
            return Err(TenancyError::SchemaNotFound(schema.to_string()));
        }

        info!(schema, "dropping tenant schema");
        self.db
            .execute_raw(Statement::from_string(
                backend,
                format!("DROP SCHEMA IF EXISTS \"{schema}\" CASCADE"),
            ))
            .await
            .map_err(|e| TenancyError::Migration(format!("drop schema {schema}: {e}")))?;
        Ok(())
    }

    /// Whether `schema` exists in the connected database.
    pub async fn schema_exists(&self, schema: &str) -> TenancyResult<bool> {
        let backend = self.backend()?;
        validate_schema_name(schema)?;

        let row = self
            .db
            .query_one_raw(Statement::from_sql_and_values(
                backend,
                "SELECT COUNT(*) AS count FROM information_schema.schemata \
                 WHERE schema_name = $1",
                [schema.into()],
            ))
            .await?;
        let count: i64 = match row {
            Some(row) => row.try_get("", "count")?,
            None => 0,
        };
        Ok(count > 0)
    }

    fn check_tenant_schema_name(&self, schema: &str) -> TenancyResult<()> {
        validate_schema_name(schema)?;
        if schema == self.registry.public_schema() {
            return Err(TenancyError::NamingConvention(format!(
                "{schema:?} is the shared schema, not a tenant schema"
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SchemaMigrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaMigrator")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
