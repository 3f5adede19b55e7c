//! Registered service directory.
//!
//! The validation chain consumes the [`ServiceDirectory`] trait and never
//! writes through it. [`InMemoryServiceDirectory`] is the bundled
//! implementation, seeded programmatically or from a JSON registry file;
//! other backends implement the trait in their own crates.

pub mod directory;
pub mod memory;

pub use directory::ServiceDirectory;
pub use memory::InMemoryServiceDirectory;
