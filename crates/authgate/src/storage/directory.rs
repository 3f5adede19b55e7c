//! Registered service directory trait.
//!
//! Defines the lookup interface the validation chain consumes. The directory
//! owns its store and its synchronization; every call is a point-in-time read.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::RegisteredClientService;

// =============================================================================
// Service Directory Trait
// =============================================================================

/// Lookup of registered client services.
///
/// # Example
///
/// ```ignore
/// use authgate::storage::ServiceDirectory;
///
/// async fn example(directory: &impl ServiceDirectory) -> authgate::AuthResult<()> {
///     if let Some(service) = directory.resolve("https://callback.example.org").await? {
///         println!("Resolved service: {}", service.name);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    /// Find the service whose id pattern matches a canonical service id.
    ///
    /// When several services match, the one with the lowest evaluation
    /// order wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read. A missing
    /// service is `Ok(None)`, not an error.
    async fn resolve(&self, service_id: &str) -> AuthResult<Option<RegisteredClientService>>;

    /// Find a service by its OAuth client_id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    async fn find_by_client_id(&self, client_id: &str)
    -> AuthResult<Option<RegisteredClientService>>;

    /// List every registered service, in evaluation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    async fn list_all(&self) -> AuthResult<Vec<RegisteredClientService>>;
}
