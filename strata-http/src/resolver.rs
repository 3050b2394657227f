//! Tenant extraction strategies.
//!
//! A [`TenantGetter`] pulls a tenant *candidate* out of a request; it does
//! no validation and no I/O. The middleware tries its configured getters in
//! order and validates the first candidate against the tenant store, so
//! earlier getters take precedence.

use crate::http::HttpRequest;
use regex::Regex;

/// One extraction strategy.
pub trait TenantGetter: Send + Sync {
    /// Strategy name, recorded in the context as the resolved-by marker.
    fn name(&self) -> &'static str;

    /// Extract a candidate tenant identifier, if this request carries one.
    fn extract(&self, request: &HttpRequest) -> Option<String>;
}

/// Extracts the tenant from a request header (e.g. `X-Tenant`).
pub struct HeaderGetter {
    header: String,
}

impl HeaderGetter {
    /// Create a getter reading `header`.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_http::resolver::HeaderGetter;
    ///
    /// let getter = HeaderGetter::new("X-Tenant");
    /// ```
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl TenantGetter for HeaderGetter {
    fn name(&self) -> &'static str {
        "header"
    }

    fn extract(&self, request: &HttpRequest) -> Option<String> {
        request
            .header(&self.header)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Extracts the tenant from the host's subdomain
/// (`acme.example.com` -> `acme`).
pub struct SubdomainGetter {
    base_domain: String,
}

impl SubdomainGetter {
    /// Create a getter for hosts under `base_domain`.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_http::resolver::SubdomainGetter;
    ///
    /// let getter = SubdomainGetter::new("example.com");
    /// ```
    pub fn new(base_domain: impl Into<String>) -> Self {
        Self {
            base_domain: base_domain.into(),
        }
    }

    fn subdomain_of(&self, host: &str) -> Option<String> {
        // Port, if any, is not part of the domain.
        let host = host.split(':').next().unwrap_or(host);
        let subdomain = host.strip_suffix(&format!(".{}", self.base_domain))?;
        if subdomain.is_empty() || subdomain.contains('.') {
            return None;
        }
        Some(subdomain.to_string())
    }
}

impl TenantGetter for SubdomainGetter {
    fn name(&self) -> &'static str {
        "subdomain"
    }

    fn extract(&self, request: &HttpRequest) -> Option<String> {
        self.subdomain_of(request.header("host")?)
    }
}

/// Extracts the tenant from the request path via a regex capture group
/// (e.g. `^/tenants/([^/]+)` on `/tenants/acme/books`).
pub struct PathGetter {
    pattern: Regex,
    group: usize,
}

impl PathGetter {
    /// Create a getter matching `pattern` and capturing group `group`.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_http::resolver::PathGetter;
    ///
    /// let getter = PathGetter::new(r"^/tenants/([^/]+)", 1).unwrap();
    /// ```
    pub fn new(pattern: &str, group: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            group,
        })
    }
}

impl TenantGetter for PathGetter {
    fn name(&self) -> &'static str {
        "path"
    }

    fn extract(&self, request: &HttpRequest) -> Option<String> {
        self.pattern
            .captures(&request.path)?
            .get(self.group)
            .map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_getter_trims_and_rejects_empty() {
        let getter = HeaderGetter::new("X-Tenant");

        let request = HttpRequest::new("GET", "/").with_header("X-Tenant", " acme ");
        assert_eq!(getter.extract(&request), Some("acme".to_string()));

        let request = HttpRequest::new("GET", "/").with_header("X-Tenant", "  ");
        assert_eq!(getter.extract(&request), None);

        let request = HttpRequest::new("GET", "/");
        assert_eq!(getter.extract(&request), None);
    }

    #[test]
    fn subdomain_getter_parses_host() {
        let getter = SubdomainGetter::new("example.com");

        let with_host = |host: &str| HttpRequest::new("GET", "/").with_header("host", host);

        assert_eq!(
            getter.extract(&with_host("acme.example.com")),
            Some("acme".to_string())
        );
        assert_eq!(
            getter.extract(&with_host("acme.example.com:8080")),
            Some("acme".to_string())
        );
        // Bare apex, nested subdomain, unrelated domain: no candidate.
        assert_eq!(getter.extract(&with_host("example.com")), None);
        assert_eq!(getter.extract(&with_host("a.b.example.com")), None);
        assert_eq!(getter.extract(&with_host("acme.other.com")), None);
    }

    #[test]
    fn path_getter_captures_group() {
        let getter = PathGetter::new(r"^/tenants/([^/]+)", 1).unwrap();

        let request = HttpRequest::new("GET", "/tenants/acme/books");
        assert_eq!(getter.extract(&request), Some("acme".to_string()));

        let request = HttpRequest::new("GET", "/books");
        assert_eq!(getter.extract(&request), None);
    }

    #[test]
    fn path_getter_rejects_bad_patterns() {
        assert!(PathGetter::new(r"^/tenants/(", 1).is_err());
    }
}
