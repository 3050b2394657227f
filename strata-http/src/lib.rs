//! # Strata HTTP
//!
//! HTTP-side tenant resolution for the strata tenancy layer.
//!
//! The crate is framework-independent: it defines a minimal request/response
//! pair and a handler-wrapping [`Middleware`] contract, and supplies
//! [`TenantMiddleware`], which resolves the tenant for each request and
//! threads it through the request's [`TenantContext`](strata_core::TenantContext).
//! Adapters for concrete frameworks convert their request type at the
//! boundary.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strata_http::prelude::*;
//! use std::sync::Arc;
//!
//! let store = Arc::new(DbTenantStore::new(db.clone()));
//! let mut chain = MiddlewareChain::new();
//! chain.use_middleware(
//!     TenantMiddleware::new(store)
//!         .with_getter(SubdomainGetter::new("example.com"))
//!         .with_getter(HeaderGetter::new("X-Tenant"))
//!         .skip_paths(["/health"]),
//! );
//!
//! let response = chain
//!     .apply(request, Arc::new(|request| {
//!         Box::pin(async move {
//!             // request.tenant_schema() is the resolved schema;
//!             // scope queries with strata_core::scope::with_tenant.
//!             Ok(HttpResponse::ok())
//!         })
//!     }))
//!     .await?;
//! ```

pub mod http;
pub mod middleware;
pub mod resolver;

pub use http::{HttpRequest, HttpResponse};
pub use middleware::{HandlerFn, Middleware, MiddlewareChain, Next, RejectWith, TenantMiddleware};
pub use resolver::{HeaderGetter, PathGetter, SubdomainGetter, TenantGetter};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::http::{HttpRequest, HttpResponse};
    pub use crate::middleware::{Middleware, MiddlewareChain, RejectWith, TenantMiddleware};
    pub use crate::resolver::{HeaderGetter, PathGetter, SubdomainGetter, TenantGetter};
    pub use strata_core::prelude::*;
}
