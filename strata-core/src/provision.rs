//! Tenant lifecycle provisioning.
//!
//! Couples the two halves of onboarding a tenant: the record in
//! `public.tenants` and the tenant's private schema. Schema creation runs
//! first — it is idempotent, so a failure between the two steps is repaired
//! by re-running `create`.

use crate::error::TenancyResult;
use crate::migrate::SchemaMigrator;
use crate::model::validate_schema_name;
use crate::tenant::{tenants, Tenant};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;

/// Creates and tears down tenants end to end.
pub struct TenantProvisioner {
    db: DatabaseConnection,
    migrator: SchemaMigrator,
}

impl TenantProvisioner {
    /// Create a provisioner writing tenant records through `db` and
    /// schemas through `migrator`.
    pub fn new(db: DatabaseConnection, migrator: SchemaMigrator) -> Self {
        Self { db, migrator }
    }

    /// Provision `tenant`: create and migrate its schema, then persist the
    /// record.
    pub async fn create(&self, tenant: Tenant) -> TenancyResult<Tenant> {
        validate_schema_name(&tenant.schema_name)?;
        info!(schema = %tenant.schema_name, "provisioning tenant");

        self.migrator
            .create_schema_for_tenant(&tenant.schema_name)
            .await?;

        let inserted = tenants::ActiveModel {
            id: Set(tenant.id),
            schema_name: Set(tenant.schema_name),
            domain_url: Set(tenant.domain_url),
            active: Set(tenant.active),
            created_at: Set(tenant.created_at.into()),
        }
        .insert(&self.db)
        .await?;
        Ok(inserted.into())
    }

    /// Tear `schema` down: drop the schema with everything in it, then
    /// delete the record.
    pub async fn remove(&self, schema: &str) -> TenancyResult<()> {
        info!(schema, "removing tenant");
        self.migrator.drop_schema_for_tenant(schema).await?;
        tenants::Entity::delete_many()
            .filter(tenants::Column::SchemaName.eq(schema))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SchemaEntity;
    use crate::registry::ModelRegistry;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use uuid::Uuid;

    mod books {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
        #[sea_orm(table_name = "books")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            pub title: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    impl SchemaEntity for books::Entity {
        fn tenant_scoped() -> bool {
            true
        }
    }

    fn registry() -> Arc<ModelRegistry> {
        let registry = ModelRegistry::new();
        registry.register::<crate::tenant::tenants::Entity>().unwrap();
        registry.register::<books::Entity>().unwrap();
        Arc::new(registry)
    }

    fn exec_ok(n: usize) -> Vec<MockExecResult> {
        vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            };
            n
        ]
    }

    fn acme_row() -> tenants::Model {
        tenants::Model {
            id: Uuid::new_v4(),
            schema_name: "acme".to_string(),
            domain_url: Some("acme.example.com".to_string()),
            active: true,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn create_provisions_schema_then_record() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(exec_ok(3))
            .append_query_results([vec![acme_row()]])
            .into_connection();
        let provisioner =
            TenantProvisioner::new(db.clone(), SchemaMigrator::new(db.clone(), registry()));

        let created = provisioner
            .create(Tenant::new("acme").with_domain("acme.example.com"))
            .await
            .unwrap();
        assert_eq!(created.schema_name, "acme");

        let log = format!("{:?}", db.into_transaction_log());
        let schema = log.find(r#"CREATE SCHEMA IF NOT EXISTS \"acme\""#).unwrap();
        let insert = log.find("INSERT INTO").unwrap();
        assert!(schema < insert);
    }

    #[tokio::test]
    async fn create_rejects_invalid_schema_names() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let provisioner =
            TenantProvisioner::new(db.clone(), SchemaMigrator::new(db, registry()));

        let err = provisioner
            .create(Tenant::new("Robert'); DROP TABLE tenants"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::TenancyError::NamingConvention(_)));
    }

    #[tokio::test]
    async fn remove_drops_schema_then_record() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(exec_ok(2))
            .into_connection();
        let provisioner =
            TenantProvisioner::new(db.clone(), SchemaMigrator::new(db.clone(), registry()));

        provisioner.remove("acme").await.unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        let drop = log.find(r#"DROP SCHEMA IF EXISTS \"acme\" CASCADE"#).unwrap();
        let delete = log.find("DELETE FROM").unwrap();
        assert!(drop < delete);
    }
}
