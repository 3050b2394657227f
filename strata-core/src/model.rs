//! Model classification.
//!
//! Every entity registered with the tenancy layer is classified as either
//! *public* (its table lives in the shared schema) or *tenant* (its table is
//! created once per tenant schema). Classification is driven by an explicit
//! capability trait, not by inspecting the entity's structure.
//!
//! # Usage
//!
//! ```rust,ignore
//! use strata_core::SchemaEntity;
//!
//! // Public model: qualified with the shared schema.
//! #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
//! #[sea_orm(schema_name = "public", table_name = "tenants")]
//! pub struct Model { /* ... */ }
//!
//! impl SchemaEntity for Entity {}
//!
//! // Tenant model: unqualified, bound to the active schema at runtime.
//! #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
//! #[sea_orm(table_name = "books")]
//! pub struct Model { /* ... */ }
//!
//! impl SchemaEntity for Entity {
//!     fn tenant_scoped() -> bool {
//!         true
//!     }
//! }
//! ```

use crate::error::{TenancyError, TenancyResult};
use regex::Regex;
use sea_orm::{DbBackend, EntityTrait, Schema};
use sea_query::TableCreateStatement;
use std::sync::Arc;
use std::sync::LazyLock;

/// Schema classification for a registered model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaClass {
    /// Lives in the shared schema, visible to every tenant.
    Public,
    /// Lives in a per-tenant schema; the table name binds to whichever
    /// schema is on the active search path.
    Tenant,
}

impl std::fmt::Display for SchemaClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Tenant => write!(f, "tenant"),
        }
    }
}

/// Capability contract for registrable entities.
///
/// Implement this for every SeaORM entity handed to the
/// [`ModelRegistry`](crate::ModelRegistry). The default classification is
/// public; tenant-scoped entities override [`tenant_scoped`] to return true.
///
/// [`tenant_scoped`]: SchemaEntity::tenant_scoped
pub trait SchemaEntity: EntityTrait {
    /// Whether this entity's table lives in per-tenant schemas.
    fn tenant_scoped() -> bool {
        false
    }
}

type DdlBuilder = Arc<dyn Fn(DbBackend) -> TableCreateStatement + Send + Sync>;

/// Classification metadata derived from one entity type.
///
/// Built once at registration and immutable afterwards. The DDL builder
/// closes over the entity type so the migrator can render a
/// `CREATE TABLE IF NOT EXISTS` for any backend without re-deriving shape.
#[derive(Clone)]
pub struct ModelDescriptor {
    model: &'static str,
    table: String,
    schema: Option<String>,
    class: SchemaClass,
    ddl: DdlBuilder,
}

impl ModelDescriptor {
    /// Rust type name of the entity, for diagnostics.
    pub fn model(&self) -> &'static str {
        self.model
    }

    /// Unqualified table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Declared schema qualifier, if any.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Classification of this model.
    pub fn class(&self) -> SchemaClass {
        self.class
    }

    /// Table name as it appears to SQL: `public.tenants` for public models,
    /// the bare table name for tenant models.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.table),
            None => self.table.clone(),
        }
    }

    /// Render the idempotent create-table statement for `backend`.
    pub fn create_statement(&self, backend: DbBackend) -> TableCreateStatement {
        (self.ddl)(backend)
    }
}

impl std::fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("model", &self.model)
            .field("table", &self.table)
            .field("schema", &self.schema)
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

/// Classify an entity type into a [`ModelDescriptor`].
///
/// Pure function of the entity's declared capability and table metadata.
/// An entity reporting an empty table name is rejected with
/// [`TenancyError::Configuration`].
pub fn classify<E: SchemaEntity>() -> TenancyResult<ModelDescriptor> {
    let entity = E::default();
    let table = entity.table_name().to_string();
    if table.is_empty() {
        return Err(TenancyError::Configuration(format!(
            "entity {} declares no table name",
            std::any::type_name::<E>()
        )));
    }

    let class = if E::tenant_scoped() {
        SchemaClass::Tenant
    } else {
        SchemaClass::Public
    };

    Ok(ModelDescriptor {
        model: std::any::type_name::<E>(),
        table,
        schema: entity.schema_name().map(str::to_string),
        class,
        ddl: Arc::new(|backend| {
            let mut stmt = Schema::new(backend).create_table_from_entity(E::default());
            stmt.if_not_exists();
            stmt
        }),
    })
}

static SCHEMA_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("schema name pattern"));

/// Validate a schema identifier before it is spliced into DDL.
///
/// Identifiers cannot be bound as statement parameters, so this check is
/// the injection guard for every `CREATE SCHEMA`/`DROP SCHEMA`/`search_path`
/// statement the crate emits. Names reserved by PostgreSQL (`pg_*`) are
/// rejected as well.
pub fn validate_schema_name(name: &str) -> TenancyResult<()> {
    if !SCHEMA_NAME.is_match(name) {
        return Err(TenancyError::NamingConvention(format!(
            "{name:?} is not a valid schema name"
        )));
    }
    if name.starts_with("pg_") {
        return Err(TenancyError::NamingConvention(format!(
            "{name:?} uses a reserved prefix"
        )));
    }
    Ok(())
}
