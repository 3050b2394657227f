//! Query scoping.
//!
//! A [`TenantScope`] redirects queries to one tenant's schema by setting the
//! session search path. The scope is only ever applied to a single acquired
//! session — a [`DatabaseTransaction`] — never to the pool-wide connection:
//! applying it at pool granularity would leak one tenant's search path into
//! other requests' queries. `SET LOCAL` additionally confines the setting to
//! the enclosing transaction, so nothing survives commit or rollback when
//! the session returns to the pool.
//!
//! # Usage
//!
//! ```rust,ignore
//! use strata_core::scope::with_tenant;
//!
//! let scope = with_tenant("acme")?;
//! let txn = scope.begin(&db).await?;
//! let books = books::Entity::find().all(&txn).await?;
//! txn.commit().await?;
//! ```

use crate::error::{TenancyError, TenancyResult};
use crate::model::validate_schema_name;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, Statement,
    TransactionTrait,
};
use tracing::debug;

/// Query modifier binding statements to one tenant schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantScope {
    schema: String,
}

/// Build a scope for `schema`. Convenience spelling of [`TenantScope::new`].
pub fn with_tenant(schema: impl Into<String>) -> TenancyResult<TenantScope> {
    TenantScope::new(schema)
}

impl TenantScope {
    /// Build a scope for `schema`.
    ///
    /// The name is validated here, once, so every later application can
    /// splice it into SQL safely.
    pub fn new(schema: impl Into<String>) -> TenancyResult<Self> {
        let schema = schema.into();
        validate_schema_name(&schema)?;
        Ok(Self { schema })
    }

    /// The schema this scope routes to.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Apply the scope to an already-acquired session.
    ///
    /// `conn` must be a transaction (or another single-session handle):
    /// `SET LOCAL` is rejected by PostgreSQL outside a transaction block,
    /// which doubles as a guard against accidental pool-wide application.
    pub async fn apply<C: ConnectionTrait>(&self, conn: &C) -> TenancyResult<()> {
        let backend = conn.get_database_backend();
        if backend != DbBackend::Postgres {
            return Err(TenancyError::Migration(format!(
                "schema scoping requires PostgreSQL, connected backend is {backend:?}"
            )));
        }
        debug!(schema = %self.schema, "scoping session search_path");
        conn.execute_raw(Statement::from_string(
            backend,
            format!("SET LOCAL search_path TO \"{}\"", self.schema),
        ))
        .await?;
        Ok(())
    }

    /// Acquire one session from the pool and scope it to this tenant.
    ///
    /// The caller runs its queries against the returned transaction and
    /// commits (or drops) it; the search path dies with the transaction.
    pub async fn begin(&self, db: &DatabaseConnection) -> TenancyResult<DatabaseTransaction> {
        let txn = db.begin().await?;
        self.apply(&txn).await?;
        Ok(txn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn begin_scopes_exactly_one_session() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let scope = with_tenant("acme").unwrap();
        let txn = scope.begin(&db).await.unwrap();
        txn.commit().await.unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(r#"SET LOCAL search_path TO \"acme\""#));
    }

    #[tokio::test]
    async fn distinct_scopes_target_distinct_schemas() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let a = with_tenant("acme").unwrap();
        let b = with_tenant("globex").unwrap();

        let txn = a.begin(&db).await.unwrap();
        txn.commit().await.unwrap();
        let txn = b.begin(&db).await.unwrap();
        txn.commit().await.unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        let acme = log.find(r#"search_path TO \"acme\""#).unwrap();
        let globex = log.find(r#"search_path TO \"globex\""#).unwrap();
        assert!(acme < globex);
    }

    #[test]
    fn invalid_schema_names_never_reach_sql() {
        assert!(with_tenant("acme\"; DROP SCHEMA public").is_err());
        assert!(with_tenant("").is_err());
    }

    #[tokio::test]
    async fn non_postgres_session_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let scope = with_tenant("acme").unwrap();
        let err = scope.begin(&db).await.unwrap_err();
        assert!(matches!(err, TenancyError::Migration(_)));
    }
}
