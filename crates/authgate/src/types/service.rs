//! Registered client service domain types.
//!
//! A [`RegisteredClientService`] is the administrative record of an OAuth
//! client application: which redirect URIs identify it, which response and
//! grant types it may use, and the [`AccessStrategy`] gating its use.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::access::AccessStrategy;
use crate::types::response_type::{GrantType, ResponseType};

// =============================================================================
// Service Id Pattern
// =============================================================================

/// Regular expression identifying the redirect URIs that belong to a service.
///
/// The pattern is anchored on both ends, so `https://app.example.org` does
/// not match `https://app.example.org.evil.com`.
#[derive(Clone)]
pub struct ServiceIdPattern {
    pattern: String,
    regex: Regex,
}

impl ServiceIdPattern {
    /// Compiles a service id pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is empty or not a valid regular
    /// expression.
    pub fn new(pattern: impl Into<String>) -> Result<Self, ServiceValidationError> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(ServiceValidationError::EmptyServiceId);
        }

        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            ServiceValidationError::InvalidServiceId {
                pattern: pattern.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self { pattern, regex })
    }

    /// Returns the pattern as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Checks whether a canonical service id matches this pattern.
    #[must_use]
    pub fn matches(&self, service_id: &str) -> bool {
        self.regex.is_match(service_id)
    }
}

impl fmt::Debug for ServiceIdPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceIdPattern").field(&self.pattern).finish()
    }
}

impl fmt::Display for ServiceIdPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl PartialEq for ServiceIdPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for ServiceIdPattern {}

impl Serialize for ServiceIdPattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.pattern)
    }
}

impl<'de> Deserialize<'de> for ServiceIdPattern {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Registered Client Service
// =============================================================================

/// OAuth client application registered with the authorization server.
///
/// Supported response and grant type sets use the same convention: an empty
/// set permits every type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredClientService {
    /// Numeric identifier, unique within a directory.
    pub id: i64,

    /// Human-readable display name.
    pub name: String,

    /// Detailed description of the client application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Pattern matched against canonical redirect URIs.
    pub service_id: ServiceIdPattern,

    /// OAuth client identifier.
    pub client_id: String,

    /// Client secret digest. Never inspected during request validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Response types this service may request. Empty permits all.
    #[serde(default)]
    pub supported_response_types: HashSet<String>,

    /// Grant types this service may use. Empty permits all.
    #[serde(default)]
    pub supported_grant_types: HashSet<String>,

    /// Usage policy for this service.
    #[serde(default)]
    pub access_strategy: AccessStrategy,

    /// Lower values are matched first when several services share a
    /// redirect URI.
    #[serde(default)]
    pub evaluation_order: i32,
}

impl RegisteredClientService {
    /// Creates a service with wildcard capabilities and an enabled access
    /// strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if `service_id` is not a valid pattern.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        client_id: impl Into<String>,
        service_id: impl Into<String>,
    ) -> Result<Self, ServiceValidationError> {
        Ok(Self {
            id,
            name: name.into(),
            description: None,
            service_id: ServiceIdPattern::new(service_id)?,
            client_id: client_id.into(),
            client_secret: None,
            supported_response_types: HashSet::new(),
            supported_grant_types: HashSet::new(),
            access_strategy: AccessStrategy::default(),
            evaluation_order: 0,
        })
    }

    /// Sets the client secret digest.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Replaces the supported response types.
    #[must_use]
    pub fn with_supported_response_types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = ResponseType>,
    {
        self.supported_response_types = types.into_iter().map(|t| t.as_str().to_string()).collect();
        self
    }

    /// Replaces the supported grant types.
    #[must_use]
    pub fn with_supported_grant_types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = GrantType>,
    {
        self.supported_grant_types = types.into_iter().map(|t| t.as_str().to_string()).collect();
        self
    }

    /// Replaces the access strategy.
    #[must_use]
    pub fn with_access_strategy(mut self, strategy: AccessStrategy) -> Self {
        self.access_strategy = strategy;
        self
    }

    /// Sets the evaluation order.
    #[must_use]
    pub fn with_evaluation_order(mut self, order: i32) -> Self {
        self.evaluation_order = order;
        self
    }

    /// Checks whether a canonical service id belongs to this service.
    #[must_use]
    pub fn matches(&self, service_id: &str) -> bool {
        self.service_id.matches(service_id)
    }

    /// Checks whether this service may request the given response type.
    ///
    /// An empty set of supported response types permits every type.
    #[must_use]
    pub fn is_response_type_supported(&self, response_type: ResponseType) -> bool {
        self.supported_response_types.is_empty()
            || self.supported_response_types.contains(response_type.as_str())
    }

    /// Checks whether this service may use the given grant type.
    ///
    /// An empty set of supported grant types permits every type.
    #[must_use]
    pub fn is_grant_type_supported(&self, grant_type: GrantType) -> bool {
        self.supported_grant_types.is_empty()
            || self.supported_grant_types.contains(grant_type.as_str())
    }

    /// Validates the service definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or client id is blank, or if a supported
    /// response or grant type is not a recognized token.
    pub fn validate(&self) -> Result<(), ServiceValidationError> {
        if self.name.trim().is_empty() {
            return Err(ServiceValidationError::EmptyName);
        }

        if self.client_id.trim().is_empty() {
            return Err(ServiceValidationError::EmptyClientId);
        }

        if let Some(unknown) = self
            .supported_response_types
            .iter()
            .find(|t| ResponseType::parse(t).is_none())
        {
            return Err(ServiceValidationError::UnknownResponseType(unknown.clone()));
        }

        if let Some(unknown) = self
            .supported_grant_types
            .iter()
            .find(|t| GrantType::parse(t).is_none())
        {
            return Err(ServiceValidationError::UnknownGrantType(unknown.clone()));
        }

        Ok(())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Errors that can occur when defining a registered service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceValidationError {
    /// Service name cannot be empty.
    #[error("Service name cannot be empty")]
    EmptyName,

    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty")]
    EmptyClientId,

    /// Service id pattern cannot be empty.
    #[error("Service id pattern cannot be empty")]
    EmptyServiceId,

    /// Service id pattern is not a valid regular expression.
    #[error("Invalid service id pattern '{pattern}': {reason}")]
    InvalidServiceId {
        /// The rejected pattern.
        pattern: String,
        /// Why compilation failed.
        reason: String,
    },

    /// A supported response type is not recognized.
    #[error("Unknown response type: {0}")]
    UnknownResponseType(String),

    /// A supported grant type is not recognized.
    #[error("Unknown grant type: {0}")]
    UnknownGrantType(String),
}

// =============================================================================
// Tests
// =============================================================================
