//! OAuth 2.0 authorization request validation.
//!
//! This module decides whether an inbound authorization-endpoint request may
//! proceed:
//!
//! - [`resolver`] - Canonicalizes redirect URIs and finds their registered service
//! - [`validator`] - Per-flow validation, one validator per response type
//! - [`chain`] - Precedence-ordered, first-match dispatch over validators
//! - [`authorize`] - Error responses for denied requests
//!
//! # Example
//!
//! ```ignore
//! use authgate::oauth::ValidationChain;
//! use authgate::policy::RegisteredServiceAccessStrategyEnforcer;
//!
//! let chain = ValidationChain::with_default_flows(
//!     directory,
//!     Arc::new(RegisteredServiceAccessStrategyEnforcer::new()),
//! );
//!
//! let verdict = chain.evaluate(&request).await?;
//! if let Verdict::Deny(reason) = verdict {
//!     let error = AuthorizationError::new(reason.error_code(), state);
//!     let redirect_url = error.to_redirect_url(redirect_uri)?;
//! }
//! ```

pub mod authorize;
pub mod chain;
pub mod resolver;
pub mod validator;

// Authorization endpoint error types
pub use authorize::{AuthorizationError, AuthorizationErrorCode};

// Dispatch
pub use chain::{ValidationChain, ValidationChainBuilder};

// Service resolution
pub use resolver::{ServiceIdentityResolver, ServiceReference};

// Flow validation
pub use validator::{
    DenialReason, FlowValidator, HIGHEST_PRECEDENCE, LOWEST_PRECEDENCE, Verdict,
};
