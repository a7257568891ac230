//! # Actor Protocol
//!
//! Type-safe message definitions for the ScriptLink actor system.
//!
//! This crate has no I/O and no UI dependencies, so everything in it is
//! testable in plain native Rust.
//!
//! - **UiCommand**: Messages from the presentation layer → SessionActor
//! - **SystemEvent**: Messages from the actor system → presentation layer
//! - **ConnectionState**: the link's two-state machine
//!
//! ## Message Flow
//!
//! ```text
//! UI → UiCommand → SessionActor → SerialLink.write
//!                       ↓              ↓ (read loop)
//!                  SystemEvent  ←  Transcript
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod errors;
pub mod messages;
pub mod state;

pub use errors::{ActorError, ConnectionError, WriteError};
pub use messages::{StatusLevel, SystemEvent, UiCommand};
pub use state::ConnectionState;
