//! HTTP request and response types.
//!
//! Minimal framework-independent wrappers: enough surface for middleware to
//! read headers and paths and for handlers to read the tenant context the
//! resolver threaded through the request. Adapters for concrete frameworks
//! convert at the boundary.

use serde::Serialize;
use std::collections::HashMap;
use strata_core::TenantContext;

/// HTTP request wrapper.
///
/// Header names are normalized to lowercase on insert and lookup.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Headers, lowercase-keyed.
    pub headers: HashMap<String, String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
    /// Request-scoped tenant context, populated by the resolver middleware.
    pub context: TenantContext,
}

impl HttpRequest {
    /// Create a request with no headers or body.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            body: Vec::new(),
            context: TenantContext::new(),
        }
    }

    /// Attach a header, normalizing the name to lowercase.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_lowercase(), value.into());
        self
    }

    /// Get a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// The resolved tenant's schema, if the resolver has run.
    pub fn tenant_schema(&self) -> Option<&str> {
        self.context.schema()
    }
}

/// HTTP response wrapper.
#[derive(Debug)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// 200 OK.
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// 401 Unauthorized.
    pub fn unauthorized() -> Self {
        Self::new(401)
    }

    /// 404 Not Found.
    pub fn not_found() -> Self {
        Self::new(404)
    }

    /// Set the body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = serde_json::to_vec(value)?;
        self.headers
            .insert("content-type".to_string(), "application/json".to_string());
        Ok(self)
    }
}
