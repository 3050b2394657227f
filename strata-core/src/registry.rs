//! Model registry.
//!
//! Process-wide store mapping each registered entity type to its
//! [`ModelDescriptor`]. The registry is an explicit object owned by the
//! caller and threaded into the migrator — there is no ambient singleton.
//! Registration is expected during startup; reads afterwards are lock-cheap
//! and concurrent.

use crate::error::{TenancyError, TenancyResult};
use crate::model::{classify, ModelDescriptor, SchemaClass, SchemaEntity};
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;

/// Registry of classified models, keyed by entity type.
///
/// # Usage
///
/// ```rust,ignore
/// let registry = ModelRegistry::new();
/// registry.register::<tenants::Entity>()?;
/// registry.register::<books::Entity>()?;
///
/// assert_eq!(registry.public_tables(), vec!["public.tenants"]);
/// assert_eq!(registry.tenant_tables(), vec!["books"]);
/// ```
pub struct ModelRegistry {
    public_schema: String,
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    order: Vec<TypeId>,
    models: HashMap<TypeId, ModelDescriptor>,
}

impl ModelRegistry {
    /// Create a registry with the conventional `public` shared schema.
    pub fn new() -> Self {
        Self::with_public_schema("public")
    }

    /// Create a registry whose shared schema has a non-default name.
    pub fn with_public_schema(public_schema: impl Into<String>) -> Self {
        Self {
            public_schema: public_schema.into(),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Name of the shared schema public models must be qualified with.
    pub fn public_schema(&self) -> &str {
        &self.public_schema
    }

    /// Classify and store one entity type.
    ///
    /// Public models must declare the shared schema as their qualifier;
    /// tenant models must be unqualified. Violations fail with
    /// [`TenancyError::NamingConvention`]. Registering the same entity type
    /// again overwrites its descriptor in place, keeping the original
    /// registration position.
    pub fn register<E: SchemaEntity + 'static>(&self) -> TenancyResult<()> {
        let desc = classify::<E>()?;
        self.validate(&desc)?;

        let key = TypeId::of::<E>();
        let mut inner = self.inner.write();
        if inner.models.insert(key, desc).is_none() {
            inner.order.push(key);
        }
        Ok(())
    }

    fn validate(&self, desc: &ModelDescriptor) -> TenancyResult<()> {
        if desc.table().contains('.') {
            return Err(TenancyError::NamingConvention(format!(
                "{}: table name {:?} must not embed a schema qualifier; \
                 declare `schema_name` instead",
                desc.model(),
                desc.table()
            )));
        }
        match desc.class() {
            SchemaClass::Public => match desc.schema() {
                Some(schema) if schema == self.public_schema => Ok(()),
                Some(schema) => Err(TenancyError::NamingConvention(format!(
                    "{}: public model is qualified with {:?}, expected {:?}",
                    desc.model(),
                    schema,
                    self.public_schema
                ))),
                None => Err(TenancyError::NamingConvention(format!(
                    "{}: public model {:?} must be qualified with the {:?} schema",
                    desc.model(),
                    desc.table(),
                    self.public_schema
                ))),
            },
            SchemaClass::Tenant => match desc.schema() {
                None => Ok(()),
                Some(schema) => Err(TenancyError::NamingConvention(format!(
                    "{}: tenant model {:?} must be unqualified, found schema {:?}",
                    desc.model(),
                    desc.table(),
                    schema
                ))),
            },
        }
    }

    /// Descriptors of one class, in registration order.
    pub fn descriptors(&self, class: SchemaClass) -> Vec<ModelDescriptor> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|key| inner.models.get(key))
            .filter(|desc| desc.class() == class)
            .cloned()
            .collect()
    }

    /// Qualified table names of every public model, in registration order.
    pub fn public_tables(&self) -> Vec<String> {
        self.descriptors(SchemaClass::Public)
            .iter()
            .map(ModelDescriptor::qualified_name)
            .collect()
    }

    /// Table names of every tenant model, in registration order.
    pub fn tenant_tables(&self) -> Vec<String> {
        self.descriptors(SchemaClass::Tenant)
            .iter()
            .map(ModelDescriptor::qualified_name)
            .collect()
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    /// Whether no models are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.read().order.is_empty()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("public_schema", &self.public_schema)
            .field("models", &self.inner.read().order.len())
            .finish()
    }
}
