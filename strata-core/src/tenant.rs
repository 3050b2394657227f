//! Tenant records.
//!
//! A tenant is a row in the shared schema: at minimum a schema name plus a
//! routable identifier (domain). The core only ever reads the schema-name
//! field when creating, dropping, or scoping a schema; everything else
//! belongs to the application.
//!
//! [`TenantStore`] is the lookup contract the resolver middleware validates
//! candidates against. [`DbTenantStore`] implements it over the bundled
//! [`tenants`] entity; applications with their own tenant table implement
//! the trait directly.

use crate::error::TenancyResult;
use crate::model::SchemaEntity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One tenant, as read from the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tenant {
    /// Unique tenant identifier.
    pub id: Uuid,
    /// Name of the tenant's private schema.
    pub schema_name: String,
    /// Domain the tenant is reachable under, if subdomain-routed.
    pub domain_url: Option<String>,
    /// Deactivated tenants fail request resolution.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Create an active tenant record for `schema_name`.
    pub fn new(schema_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            schema_name: schema_name.into(),
            domain_url: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Set the tenant's domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain_url = Some(domain.into());
        self
    }

    /// Set the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Lookup contract the resolver middleware validates candidates against.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Find a tenant by its schema name.
    async fn find_by_schema(&self, schema: &str) -> TenancyResult<Option<Tenant>>;

    /// Find a tenant by its domain.
    async fn find_by_domain(&self, domain: &str) -> TenancyResult<Option<Tenant>>;
}

/// The bundled `public.tenants` entity.
///
/// A public model like any other: register it alongside the application's
/// models and `migrate_public_schema` creates it.
pub mod tenants {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    /// Row shape of `public.tenants`.
    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(schema_name = "public", table_name = "tenants")]
    pub struct Model {
        /// Unique tenant identifier.
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        /// Name of the tenant's private schema.
        #[sea_orm(column_type = "Text", unique)]
        pub schema_name: String,

        /// Domain the tenant is reachable under.
        #[sea_orm(column_type = "Text", unique)]
        pub domain_url: Option<String>,

        /// Deactivated tenants fail request resolution.
        pub active: bool,

        /// Creation timestamp.
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl SchemaEntity for tenants::Entity {}

impl From<tenants::Model> for Tenant {
    fn from(model: tenants::Model) -> Self {
        Self {
            id: model.id,
            schema_name: model.schema_name,
            domain_url: model.domain_url,
            active: model.active,
            created_at: model.created_at.to_utc(),
        }
    }
}

/// [`TenantStore`] over the bundled [`tenants`] entity.
#[derive(Clone)]
pub struct DbTenantStore {
    db: DatabaseConnection,
}

impl DbTenantStore {
    /// Create a store reading `public.tenants` through `db`.
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TenantStore for DbTenantStore {
    async fn find_by_schema(&self, schema: &str) -> TenancyResult<Option<Tenant>> {
        let found = tenants::Entity::find()
            .filter(tenants::Column::SchemaName.eq(schema))
            .one(&self.db)
            .await?;
        Ok(found.map(Tenant::from))
    }

    async fn find_by_domain(&self, domain: &str) -> TenancyResult<Option<Tenant>> {
        let found = tenants::Entity::find()
            .filter(tenants::Column::DomainUrl.eq(domain))
            .one(&self.db)
            .await?;
        Ok(found.map(Tenant::from))
    }
}
