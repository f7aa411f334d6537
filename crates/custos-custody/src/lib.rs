//! # custos-custody
//!
//! The custody rules engine: checkout and return transitions on the
//! [`Tool`](custos_domain::Tool) aggregate, gated by role capability,
//! current custody state, and calibration validity — in that order.
//!
//! The engine performs no I/O and never writes to the audit log; recording
//! the resulting event as an audit entry is the integrating caller's
//! responsibility, in the same unit of work as persisting the tool.
//!
//! ## Quick Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use custos_custody::checkout_tool;
//! use custos_domain::{Role, Tool, User};
//!
//! let due = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
//! let mut tool = Tool::new("T-100", due, true);
//! let alice = User::new("alice", Role::Technician);
//! let at = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
//!
//! let event = checkout_tool(&mut tool, &alice, at, true).unwrap();
//! assert_eq!(event.user_id, "alice");
//! assert_eq!(tool.holder.as_deref(), Some("alice"));
//! ```

pub mod engine;
pub mod error;

pub use engine::{checkout_tool, return_tool};
pub use error::CustodyError;
