//! In-memory service directory.
//!
//! Services are kept in evaluation order behind a [`RwLock`] so that
//! concurrent validations only ever take read locks. A directory can be
//! seeded from a JSON registry file: an array of services in camelCase.
//!
//! ```json
//! [
//!   {
//!     "id": 1,
//!     "name": "OAuth",
//!     "serviceId": "https://callback\\.example\\.org",
//!     "clientId": "client",
//!     "supportedResponseTypes": ["code"]
//!   }
//! ]
//! ```

use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::directory::ServiceDirectory;
use crate::types::RegisteredClientService;

/// Service directory held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryServiceDirectory {
    services: RwLock<Vec<RegisteredClientService>>,
}

impl InMemoryServiceDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding the given services.
    ///
    /// # Errors
    ///
    /// Returns an error if a service fails validation or two services
    /// share an id.
    pub fn with_services(services: Vec<RegisteredClientService>) -> AuthResult<Self> {
        let directory = Self::new();
        for service in services {
            if directory.contains(service.id)? {
                return Err(AuthError::invalid_service(format!(
                    "Duplicate service id: {}",
                    service.id
                )));
            }
            directory.save(service)?;
        }
        Ok(directory)
    }

    /// Parses a JSON registry document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or a service is invalid.
    pub fn from_json_str(json: &str) -> AuthResult<Self> {
        let services: Vec<RegisteredClientService> = serde_json::from_str(json)
            .map_err(|e| AuthError::invalid_service(format!("Malformed service registry: {e}")))?;
        Self::with_services(services)
    }

    /// Loads a JSON registry file.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read, or a validation
    /// error if its contents are rejected.
    pub async fn load_json_file(path: impl AsRef<Path>) -> AuthResult<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            AuthError::storage(format!(
                "Failed to read service registry {}: {e}",
                path.display()
            ))
        })?;

        let directory = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            services = directory.len()?,
            "Loaded service registry"
        );
        Ok(directory)
    }

    /// Inserts or replaces a service, matched by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the service fails validation or the lock is
    /// poisoned.
    pub fn save(&self, service: RegisteredClientService) -> AuthResult<()> {
        service
            .validate()
            .map_err(|e| AuthError::invalid_service(e.to_string()))?;

        let mut services = self.write()?;
        match services.iter_mut().find(|s| s.id == service.id) {
            Some(existing) => *existing = service,
            None => services.push(service),
        }
        services.sort_by_key(|s| (s.evaluation_order, s.id));
        Ok(())
    }

    /// Removes a service by id, returning it if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn remove(&self, id: i64) -> AuthResult<Option<RegisteredClientService>> {
        let mut services = self.write()?;
        let removed = services
            .iter()
            .position(|s| s.id == id)
            .map(|idx| services.remove(idx));
        Ok(removed)
    }

    /// Returns whether a service with this id is registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn contains(&self, id: i64) -> AuthResult<bool> {
        Ok(self.read()?.iter().any(|s| s.id == id))
    }

    /// Returns the number of registered services.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn len(&self) -> AuthResult<usize> {
        Ok(self.read()?.len())
    }

    /// Returns whether the directory is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn is_empty(&self) -> AuthResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> AuthResult<std::sync::RwLockReadGuard<'_, Vec<RegisteredClientService>>> {
        self.services
            .read()
            .map_err(|_| AuthError::storage("Service directory lock poisoned"))
    }

    fn write(&self) -> AuthResult<std::sync::RwLockWriteGuard<'_, Vec<RegisteredClientService>>> {
        self.services
            .write()
            .map_err(|_| AuthError::storage("Service directory lock poisoned"))
    }
}

#[async_trait]
impl ServiceDirectory for InMemoryServiceDirectory {
    async fn resolve(&self, service_id: &str) -> AuthResult<Option<RegisteredClientService>> {
        Ok(self.read()?.iter().find(|s| s.matches(service_id)).cloned())
    }

    async fn find_by_client_id(
        &self,
        client_id: &str,
    ) -> AuthResult<Option<RegisteredClientService>> {
        Ok(self
            .read()?
            .iter()
            .find(|s| s.client_id == client_id)
            .cloned())
    }

    async fn list_all(&self) -> AuthResult<Vec<RegisteredClientService>> {
        Ok(self.read()?.clone())
    }
}
