//! # Tarkib — configuration-driven object resolution for Rust
//!
//! A container that builds objects from a configuration snapshot:
//! type preferences redirect interface names to concrete types, virtual
//! types alias a base type with preset arguments, and per-type configs
//! declare constructor arguments and shared (singleton) lifetime.

pub use tarkib_container::*;
pub use tarkib_support::*;
