//! # Strata Core
//!
//! Schema-per-tenant multitenancy on top of SeaORM and PostgreSQL: every
//! tenant's data lives in its own database schema, shared data lives in the
//! `public` schema, and each request's queries are routed to the right
//! schema through an explicit, request-scoped context.
//!
//! The crate supplies the tenancy routing layer only — entities, queries,
//! and connections stay plain SeaORM.
//!
//! ## Quick Start
//!
//! ### 1. Declare and register models
//!
//! ```rust,ignore
//! use strata_core::{ModelRegistry, SchemaEntity};
//!
//! // Shared across tenants: qualified with the public schema.
//! #[sea_orm(schema_name = "public", table_name = "plans")]
//! pub struct Model { /* ... */ }
//! impl SchemaEntity for plans::Entity {}
//!
//! // Private per tenant: unqualified, opts into tenant scoping.
//! #[sea_orm(table_name = "books")]
//! pub struct Model { /* ... */ }
//! impl SchemaEntity for books::Entity {
//!     fn tenant_scoped() -> bool { true }
//! }
//!
//! let registry = Arc::new(ModelRegistry::new());
//! registry.register::<strata_core::tenants::Entity>()?;
//! registry.register::<plans::Entity>()?;
//! registry.register::<books::Entity>()?;
//! ```
//!
//! ### 2. Migrate schemas
//!
//! ```rust,ignore
//! use strata_core::SchemaMigrator;
//!
//! let migrator = SchemaMigrator::new(db.clone(), registry.clone());
//! migrator.migrate_public_schema().await?;           // public.tenants, public.plans
//! migrator.create_schema_for_tenant("acme").await?;  // acme.books
//! ```
//!
//! ### 3. Scope queries per request
//!
//! ```rust,ignore
//! use strata_core::scope::with_tenant;
//!
//! let scope = with_tenant(context.schema().unwrap())?;
//! let txn = scope.begin(&db).await?;
//! let books = books::Entity::find().all(&txn).await?; // rows from acme.books only
//! txn.commit().await?;
//! ```
//!
//! Resolution of the tenant from an incoming request lives in the
//! companion `strata-http` crate.

pub mod config;
pub mod context;
pub mod error;
pub mod migrate;
pub mod model;
pub mod provision;
pub mod registry;
pub mod scope;
pub mod tenant;

pub use config::{ExistingSchema, MissingSchema, TenancyConfig};
pub use context::{CurrentTenant, TenantContext};
pub use error::{TenancyError, TenancyResult};
pub use migrate::SchemaMigrator;
pub use model::{classify, validate_schema_name, ModelDescriptor, SchemaClass, SchemaEntity};
pub use provision::TenantProvisioner;
pub use registry::ModelRegistry;
pub use scope::{with_tenant, TenantScope};
pub use tenant::{tenants, DbTenantStore, Tenant, TenantStore};

// Re-export sea-orm for downstream entity declarations.
pub use sea_orm;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::TenancyConfig;
    pub use crate::context::TenantContext;
    pub use crate::error::{TenancyError, TenancyResult};
    pub use crate::migrate::SchemaMigrator;
    pub use crate::model::{SchemaClass, SchemaEntity};
    pub use crate::provision::TenantProvisioner;
    pub use crate::registry::ModelRegistry;
    pub use crate::scope::{with_tenant, TenantScope};
    pub use crate::tenant::{DbTenantStore, Tenant, TenantStore};
}
