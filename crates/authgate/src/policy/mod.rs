//! Access strategy enforcement.
//!
//! The [`AccessStrategyEnforcer`] trait is the pluggable gate the flow
//! validators consult last. [`RegisteredServiceAccessStrategyEnforcer`]
//! evaluates the [`AccessStrategy`](crate::types::AccessStrategy) stored on
//! each service and writes an audit record for every decision:
//!
//! ```ignore
//! use authgate::policy::{AccessStrategyEnforcer, RegisteredServiceAccessStrategyEnforcer};
//!
//! let enforcer = RegisteredServiceAccessStrategyEnforcer::new();
//! let allowed = enforcer.is_service_access_allowed(&service, &request).await?;
//! ```

pub mod enforcer;

pub use enforcer::{AccessStrategyEnforcer, RegisteredServiceAccessStrategyEnforcer};
