//! Middleware chain and tenant resolution middleware.
//!
//! Middleware here is explicit handler-wrapping: a middleware receives the
//! request plus a `next` continuation and decides whether downstream ever
//! runs. [`TenantMiddleware`] resolves the tenant for each request —
//! skip-list check, ordered extraction, store validation — and threads the
//! result through the request's [`TenantContext`]; requests it cannot
//! resolve are answered directly and never reach downstream handlers.

use crate::http::{HttpRequest, HttpResponse};
use crate::resolver::TenantGetter;
use async_trait::async_trait;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use strata_core::{TenancyError, TenancyResult, TenantStore};
use tracing::{debug, warn};

/// The next handler in the middleware chain.
pub type Next = Box<
    dyn FnOnce(HttpRequest) -> Pin<Box<dyn Future<Output = TenancyResult<HttpResponse>> + Send>>
        + Send,
>;

/// A terminal request handler.
pub type HandlerFn = Arc<
    dyn Fn(HttpRequest) -> Pin<Box<dyn Future<Output = TenancyResult<HttpResponse>> + Send>>
        + Send
        + Sync,
>;

/// Middleware processing requests on their way to the handler.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Process the request, optionally passing it to `next`.
    async fn handle(&self, request: HttpRequest, next: Next) -> TenancyResult<HttpResponse>;
}

/// Executes a stack of middleware around a handler.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Arc<Vec<Arc<dyn Middleware>>>,
}

impl MiddlewareChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware to the chain.
    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        let mut middlewares = (*self.middlewares).clone();
        middlewares.push(Arc::new(middleware));
        self.middlewares = Arc::new(middlewares);
    }

    /// Run `request` through the chain and into `handler`.
    pub async fn apply(
        &self,
        request: HttpRequest,
        handler: HandlerFn,
    ) -> TenancyResult<HttpResponse> {
        debug!(
            middleware_count = self.middlewares.len(),
            path = %request.path,
            "executing middleware chain"
        );
        self.execute_from(0, request, handler).await
    }

    fn execute_from(
        &self,
        index: usize,
        request: HttpRequest,
        handler: HandlerFn,
    ) -> Pin<Box<dyn Future<Output = TenancyResult<HttpResponse>> + Send>> {
        if index >= self.middlewares.len() {
            return handler(request);
        }
        let middleware = self.middlewares[index].clone();
        let chain = self.clone();
        Box::pin(async move {
            middleware
                .handle(
                    request,
                    Box::new(move |request| chain.execute_from(index + 1, request, handler)),
                )
                .await
        })
    }
}

/// How an unresolvable request is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RejectWith {
    /// Respond 401.
    #[default]
    Unauthorized,
    /// Respond 404, hiding tenant existence.
    NotFound,
}

impl RejectWith {
    fn status(self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::NotFound => 404,
        }
    }
}

type SkipPredicate = Arc<dyn Fn(&HttpRequest) -> bool + Send + Sync>;

/// Tenant resolution middleware.
///
/// Per request: a skip-list match passes straight through with no tenant in
/// context; otherwise the configured getters run in order, the first
/// candidate is validated against the store, and the request continues with
/// the tenant layered into its context — or is rejected without reaching
/// downstream.
///
/// # Usage
///
/// ```rust,ignore
/// use strata_http::{TenantMiddleware, RejectWith};
/// use strata_http::resolver::{HeaderGetter, SubdomainGetter};
///
/// let middleware = TenantMiddleware::new(store)
///     .with_getter(SubdomainGetter::new("example.com"))
///     .with_getter(HeaderGetter::new("X-Tenant"))
///     .skip_paths(["/health", "/metrics"])
///     .with_reject(RejectWith::NotFound);
/// ```
pub struct TenantMiddleware {
    store: Arc<dyn TenantStore>,
    getters: Vec<Arc<dyn TenantGetter>>,
    skip: Option<SkipPredicate>,
    reject_with: RejectWith,
}

impl TenantMiddleware {
    /// Create a middleware validating candidates against `store`.
    ///
    /// Without getters every non-skipped request is rejected; add at least
    /// one via [`with_getter`](Self::with_getter).
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        Self {
            store,
            getters: Vec::new(),
            skip: None,
            reject_with: RejectWith::default(),
        }
    }

    /// Append an extraction strategy. Earlier getters take precedence.
    pub fn with_getter<G: TenantGetter + 'static>(mut self, getter: G) -> Self {
        self.getters.push(Arc::new(getter));
        self
    }

    /// Set a custom skip predicate.
    pub fn with_skip(mut self, skip: impl Fn(&HttpRequest) -> bool + Send + Sync + 'static) -> Self {
        self.skip = Some(Arc::new(skip));
        self
    }

    /// Skip requests whose path exactly matches one of `paths`.
    pub fn skip_paths<I, S>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        self.with_skip(move |request| paths.iter().any(|p| p == &request.path))
    }

    /// Set how unresolvable requests are answered.
    pub fn with_reject(mut self, reject_with: RejectWith) -> Self {
        self.reject_with = reject_with;
        self
    }

    fn extract_candidate(&self, request: &HttpRequest) -> Option<(&'static str, String)> {
        self.getters.iter().find_map(|getter| {
            getter
                .extract(request)
                .filter(|candidate| !candidate.is_empty())
                .map(|candidate| (getter.name(), candidate))
        })
    }

    fn reject(&self, path: &str, reason: &str) -> TenancyResult<HttpResponse> {
        warn!(path, reason, "rejecting request without tenant");
        HttpResponse::new(self.reject_with.status())
            .with_json(&json!({ "error": "tenant resolution failed" }))
            .map_err(|e| TenancyError::TenantResolution(format!("encode error body: {e}")))
    }
}

#[async_trait]
impl Middleware for TenantMiddleware {
    async fn handle(&self, mut request: HttpRequest, next: Next) -> TenancyResult<HttpResponse> {
        if let Some(skip) = &self.skip {
            if skip(&request) {
                debug!(path = %request.path, "tenant resolution skipped");
                return next(request).await;
            }
        }

        let Some((resolved_by, candidate)) = self.extract_candidate(&request) else {
            return self.reject(&request.path, "no strategy produced a candidate");
        };

        // Store errors propagate; only unknown/inactive tenants reject.
        let tenant = match self.store.find_by_schema(&candidate).await? {
            Some(tenant) if tenant.active => tenant,
            Some(_) => return self.reject(&request.path, "tenant inactive"),
            None => return self.reject(&request.path, "unknown tenant"),
        };

        debug!(schema = %tenant.schema_name, resolved_by, "tenant resolved");
        request.context = request.context.with_tenant(tenant.schema_name, resolved_by);
        next(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{HeaderGetter, SubdomainGetter};
    use strata_core::Tenant;

    struct StaticStore {
        tenants: Vec<Tenant>,
    }

    impl StaticStore {
        fn with(tenants: Vec<Tenant>) -> Arc<Self> {
            Arc::new(Self { tenants })
        }
    }

    #[async_trait]
    impl TenantStore for StaticStore {
        async fn find_by_schema(&self, schema: &str) -> TenancyResult<Option<Tenant>> {
            Ok(self
                .tenants
                .iter()
                .find(|t| t.schema_name == schema)
                .cloned())
        }

        async fn find_by_domain(&self, domain: &str) -> TenancyResult<Option<Tenant>> {
            Ok(self
                .tenants
                .iter()
                .find(|t| t.domain_url.as_deref() == Some(domain))
                .cloned())
        }
    }

    fn passthrough() -> Next {
        Box::new(|request| {
            Box::pin(async move {
                let schema = request.tenant_schema().unwrap_or("-").to_string();
                Ok(HttpResponse::ok().with_body(schema.into_bytes()))
            })
        })
    }

    fn middleware(tenants: Vec<Tenant>) -> TenantMiddleware {
        TenantMiddleware::new(StaticStore::with(tenants))
            .with_getter(HeaderGetter::new("X-Tenant"))
    }

    #[tokio::test]
    async fn resolves_and_threads_context() {
        let mw = middleware(vec![Tenant::new("acme")]);
        let request = HttpRequest::new("GET", "/api/books").with_header("X-Tenant", "acme");

        let response = mw.handle(request, passthrough()).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"acme");
    }

    #[tokio::test]
    async fn earlier_getters_win() {
        let mw = TenantMiddleware::new(StaticStore::with(vec![
            Tenant::new("t1"),
            Tenant::new("t2"),
        ]))
        .with_getter(SubdomainGetter::new("example.com"))
        .with_getter(HeaderGetter::new("X-Tenant"));

        let request = HttpRequest::new("GET", "/")
            .with_header("host", "t1.example.com")
            .with_header("X-Tenant", "t2");

        let response = mw.handle(request, passthrough()).await.unwrap();
        assert_eq!(response.body, b"t1");
    }

    #[tokio::test]
    async fn second_getter_fills_in() {
        let mw = TenantMiddleware::new(StaticStore::with(vec![Tenant::new("t2")]))
            .with_getter(SubdomainGetter::new("example.com"))
            .with_getter(HeaderGetter::new("X-Tenant"));

        // No Host header: subdomain yields nothing, header getter runs.
        let request = HttpRequest::new("GET", "/").with_header("X-Tenant", "t2");

        let response = mw.handle(request, passthrough()).await.unwrap();
        assert_eq!(response.body, b"t2");
    }

    #[tokio::test]
    async fn skip_list_bypasses_resolution() {
        let mw = middleware(vec![Tenant::new("acme")]).skip_paths(["/health"]);

        // A valid tenant header is present, but the path is skip-listed:
        // downstream must see no tenant.
        let request = HttpRequest::new("GET", "/health").with_header("X-Tenant", "acme");

        let response = mw.handle(request, passthrough()).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"-");
    }

    #[tokio::test]
    async fn missing_candidate_rejects_with_default_status() {
        let mw = middleware(vec![Tenant::new("acme")]);
        let request = HttpRequest::new("GET", "/api/books");

        let response = mw.handle(request, passthrough()).await.unwrap();
        assert_eq!(response.status, 401);
    }

    #[tokio::test]
    async fn unknown_tenant_rejects_and_halts() {
        let mw = middleware(vec![Tenant::new("acme")]).with_reject(RejectWith::NotFound);
        let request = HttpRequest::new("GET", "/api/books").with_header("X-Tenant", "ghost");

        let downstream_ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = downstream_ran.clone();
        let next: Next = Box::new(move |_| {
            Box::pin(async move {
                flag.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(HttpResponse::ok())
            })
        });

        let response = mw.handle(request, next).await.unwrap();
        assert_eq!(response.status, 404);
        assert!(!downstream_ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn inactive_tenant_rejects() {
        let mw = middleware(vec![Tenant::new("acme").with_active(false)]);
        let request = HttpRequest::new("GET", "/api/books").with_header("X-Tenant", "acme");

        let response = mw.handle(request, passthrough()).await.unwrap();
        assert_eq!(response.status, 401);
    }

    #[tokio::test]
    async fn chain_runs_middleware_in_order() {
        let mut chain = MiddlewareChain::new();
        chain.use_middleware(middleware(vec![Tenant::new("acme")]));

        let handler: HandlerFn = Arc::new(|request| {
            Box::pin(async move {
                Ok(HttpResponse::ok()
                    .with_body(request.tenant_schema().unwrap_or("-").into()))
            })
        });

        let request = HttpRequest::new("GET", "/api/books").with_header("X-Tenant", "acme");
        let response = chain.apply(request, handler).await.unwrap();
        assert_eq!(response.body, b"acme");
    }
}
