//! Foundation types for flowsim.
//!
//! This crate provides the identity, temporal and notification types shared
//! by the file lifecycle engine (`flowsim-index`) and the branch rule engine
//! (`flowsim-refs`). Neither engine depends on the other; both depend on
//! `flowsim-types`.
//!
//! # Key Types
//!
//! - [`FileId`] -- Creation-ordered identity of a simulated file
//! - [`ContentId`] -- BLAKE3 digest of file content
//! - [`Timestamp`] -- Wall-clock anchor with a logical tie-breaker
//! - [`ChangeEvent`] -- Notification emitted for every accepted operation
//! - [`ErrorKind`] -- Rejection taxonomy shared by every engine error

pub mod content;
pub mod error;
pub mod event;
pub mod identity;
pub mod temporal;

pub use content::ContentId;
pub use error::{ErrorKind, TypeError};
pub use event::{ChangeEvent, ChangeTarget, EventKind};
pub use identity::FileId;
pub use temporal::Timestamp;
