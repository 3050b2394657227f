//! Request-scoped tenant context.
//!
//! [`TenantContext`] carries the resolved tenant through one request's
//! lifetime. It is an immutable value: [`TenantContext::with_tenant`]
//! returns a new derived context and never mutates its input, so handlers
//! running concurrently for different requests can never observe each
//! other's tenant. The carrier is framework-independent; the HTTP layer
//! threads it inside its request value.

use std::sync::Arc;

/// The tenant association carried by one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentTenant {
    /// Tenant schema name.
    pub schema: String,
    /// Name of the strategy that resolved the tenant (for example
    /// `"subdomain"` or `"header"`).
    pub resolved_by: &'static str,
}

/// Immutable, cheaply clonable tenant carrier.
#[derive(Debug, Clone, Default)]
pub struct TenantContext {
    current: Option<Arc<CurrentTenant>>,
}

impl TenantContext {
    /// An empty context with no tenant resolved.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a new context carrying `schema`.
    ///
    /// The receiver is left untouched; each call layers an independent
    /// association over the caller's value.
    pub fn with_tenant(&self, schema: impl Into<String>, resolved_by: &'static str) -> Self {
        Self {
            current: Some(Arc::new(CurrentTenant {
                schema: schema.into(),
                resolved_by,
            })),
        }
    }

    /// The resolved tenant, if any.
    pub fn current(&self) -> Option<&CurrentTenant> {
        self.current.as_deref()
    }

    /// The resolved tenant's schema name, if any.
    pub fn schema(&self) -> Option<&str> {
        self.current.as_deref().map(|t| t.schema.as_str())
    }

    /// Whether a tenant has been resolved into this context.
    pub fn has_tenant(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_has_no_tenant() {
        let ctx = TenantContext::new();
        assert!(!ctx.has_tenant());
        assert_eq!(ctx.schema(), None);
    }

    #[test]
    fn with_tenant_derives_without_mutating() {
        let base = TenantContext::new();
        let scoped = base.with_tenant("acme", "header");

        assert!(!base.has_tenant());
        assert_eq!(scoped.schema(), Some("acme"));
        assert_eq!(scoped.current().unwrap().resolved_by, "header");
    }

    #[test]
    fn layering_replaces_the_association() {
        let ctx = TenantContext::new().with_tenant("acme", "header");
        let relayered = ctx.with_tenant("globex", "subdomain");

        assert_eq!(ctx.schema(), Some("acme"));
        assert_eq!(relayered.schema(), Some("globex"));
        assert_eq!(relayered.current().unwrap().resolved_by, "subdomain");
    }
}
