//! Service identity resolution.
//!
//! Redirect URIs arrive in whatever shape the client sent them. The
//! resolver canonicalizes them into a [`ServiceReference`] and looks the
//! reference up in the [`ServiceDirectory`].

use std::sync::Arc;

use crate::AuthResult;
use crate::storage::ServiceDirectory;
use crate::types::RegisteredClientService;

/// Canonical reference to the service a redirect URI points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReference {
    id: String,
    original_url: String,
}

impl ServiceReference {
    /// Canonical id, matched against registered service patterns.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The redirect URI exactly as received.
    #[must_use]
    pub fn original_url(&self) -> &str {
        &self.original_url
    }
}

/// Turns redirect URIs into registered services.
#[derive(Clone)]
pub struct ServiceIdentityResolver {
    directory: Arc<dyn ServiceDirectory>,
}

impl ServiceIdentityResolver {
    /// Creates a resolver over the given directory.
    #[must_use]
    pub fn new(directory: Arc<dyn ServiceDirectory>) -> Self {
        Self { directory }
    }

    /// Builds the canonical service reference for a redirect URI.
    ///
    /// Canonicalization trims surrounding whitespace, drops the fragment and
    /// strips a `;jsessionid=` path parameter. Returns `None` for a blank URI.
    #[must_use]
    pub fn create_service(&self, redirect_uri: &str) -> Option<ServiceReference> {
        let trimmed = redirect_uri.trim();
        if trimmed.is_empty() {
            return None;
        }

        Some(ServiceReference {
            id: canonicalize(trimmed),
            original_url: redirect_uri.to_string(),
        })
    }

    /// Resolves a redirect URI to its registered service.
    ///
    /// # Errors
    ///
    /// Propagates directory failures. An unknown service is `Ok(None)`.
    pub async fn resolve(
        &self,
        redirect_uri: &str,
    ) -> AuthResult<Option<(ServiceReference, RegisteredClientService)>> {
        let Some(reference) = self.create_service(redirect_uri) else {
            return Ok(None);
        };

        let service = self.directory.resolve(reference.id()).await?;
        Ok(service.map(|s| (reference, s)))
    }

    /// Returns the underlying directory.
    #[must_use]
    pub fn directory(&self) -> &Arc<dyn ServiceDirectory> {
        &self.directory
    }
}

fn canonicalize(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or(url);
    strip_jsessionid(without_fragment)
}

/// Removes `;jsessionid=...` up to the next `?`, `;` or end of string.
fn strip_jsessionid(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    let Some(start) = lower.find(";jsessionid=") else {
        return url.to_string();
    };

    let rest = &url[start + 1..];
    let end = rest
        .find(['?', ';'])
        .map(|idx| start + 1 + idx)
        .unwrap_or(url.len());

    format!("{}{}", &url[..start], &url[end..])
}
