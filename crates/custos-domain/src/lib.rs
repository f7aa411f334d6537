//! # custos-domain
//!
//! Pure domain model for Custos: the closed [`Role`] set, [`User`]
//! capability predicates, and the [`Tool`] aggregate with its append-only
//! [`CheckoutEvent`] history.
//!
//! This crate performs no I/O and holds no hidden state. Tools are mutated
//! only by the custody rules engine (`custos-custody`); everything here is
//! plain data plus small predicates.
//!
//! ## Quick Example
//!
//! ```rust
//! use custos_domain::{Role, User};
//!
//! let tech = User::new("alice", Role::Technician);
//! assert!(tech.can_checkout());
//! assert!(!tech.can_view_exports());
//! ```

pub mod tool;
pub mod user;

// Re-export the main types at the crate root for convenience.
pub use tool::{CheckoutEvent, CheckoutKind, Tool};
pub use user::{Role, User};
