//! Session layer for Beacon.
//!
//! This crate describes WHAT gets advertised on the presence directory and
//! the interface of the component that talks to it:
//!
//! 1. **Descriptor**: the metadata published for this server ([`SessionInfo`])
//! 2. **Collaborator**: the component owning the directory connection
//!    ([`SessionManager`] trait)
//! 3. **Errors**: what the collaborator can report ([`SessionError`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Lifecycle controller (above)  ← builds descriptors, drives create/update
//!     ↕
//! Session layer (this crate)    ← descriptor + manager interface
//!     ↕
//! Presence directory (external) ← wire protocol owned by the manager
//! ```

mod error;
mod info;
mod manager;

pub use error::SessionError;
pub use info::SessionInfo;
pub use manager::SessionManager;
