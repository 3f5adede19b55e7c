//! Domain types shared by the validation chain, the directory and the
//! access strategy enforcer.
//!
//! ## Domain Types
//!
//! - [`RegisteredClientService`] - OAuth client registration
//! - [`AccessStrategy`] - Per-service usage policy
//! - [`ResponseType`] / [`GrantType`] - Protocol token enumerations

pub mod access;
pub mod response_type;
pub mod service;

pub use access::{AccessDenial, AccessStrategy};
pub use response_type::{GrantType, ResponseType};
pub use service::{RegisteredClientService, ServiceIdPattern, ServiceValidationError};
