//! # authgate
//!
//! OAuth 2.0 authorization-request validation.
//!
//! This crate provides:
//! - Flow validators, one per OAuth response type
//! - A precedence-ordered validation chain with first-match dispatch
//! - Redirect URI to registered service resolution
//! - Pluggable access strategy enforcement
//! - An in-memory registered service directory
//! - Digest encoding for client secrets
//! - Audit logging for access decisions and verdicts
//!
//! ## Overview
//!
//! An authorization request is a bag of string parameters. The
//! [`ValidationChain`](oauth::ValidationChain) picks the first validator whose
//! response type matches the request and asks it whether the request may
//! proceed. Protocol violations are denials (`Ok(false)`); only failures of
//! the directory or the enforcer surface as [`AuthError`].
//!
//! ## Modules
//!
//! - [`config`] - Chain, registry, audit and encoder configuration
//! - [`oauth`] - Flow validators, the validation chain and service resolution
//! - [`policy`] - Access strategy enforcement
//! - [`storage`] - Registered service directory
//! - [`types`] - Registered services, access strategies, response and grant types
//! - [`request`] - Authorization request parameters
//! - [`crypto`] - Client secret digests
//! - [`audit`] - Security event audit logging

pub mod audit;
pub mod config;
pub mod crypto;
pub mod error;
pub mod oauth;
pub mod policy;
pub mod request;
pub mod storage;
pub mod types;

pub use config::{AuthGateConfig, ConfigError};
pub use crypto::{DigestAlgorithm, DigestPasswordEncoder};
pub use error::{AuthError, ErrorCategory};
pub use oauth::{
    AuthorizationError, AuthorizationErrorCode, DenialReason, FlowValidator, LOWEST_PRECEDENCE,
    ServiceIdentityResolver, ServiceReference, ValidationChain, Verdict,
};
pub use policy::{AccessStrategyEnforcer, RegisteredServiceAccessStrategyEnforcer};
pub use request::AuthorizationRequestContext;
pub use storage::{InMemoryServiceDirectory, ServiceDirectory};
pub use types::{
    AccessDenial, AccessStrategy, GrantType, RegisteredClientService, ResponseType,
    ServiceIdPattern, ServiceValidationError,
};

/// Type alias for authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use authgate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthGateConfig, ConfigError};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::oauth::{
        DenialReason, FlowValidator, HIGHEST_PRECEDENCE, LOWEST_PRECEDENCE,
        ServiceIdentityResolver, ValidationChain, Verdict,
    };
    pub use crate::policy::{AccessStrategyEnforcer, RegisteredServiceAccessStrategyEnforcer};
    pub use crate::request::{AuthorizationRequestContext, params};
    pub use crate::storage::{InMemoryServiceDirectory, ServiceDirectory};
    pub use crate::types::{
        AccessStrategy, GrantType, RegisteredClientService, ResponseType,
    };
}
