//! # Connection Actors
//!
//! The serial side of ScriptLink.
//!
//! - **SerialLink**: owns the transport handle, the connection state and
//!   the background read loop
//! - **Transcript**: ordered, append-only log of sent/received/system events
//! - **SessionActor**: turns [`UiCommand`](actor_protocol::UiCommand)s into
//!   link operations and status events
//! - **mock**: in-memory transport for tests and demos

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod config;
pub mod constants;
pub mod link;
pub mod mock;
pub mod session_actor;
pub mod transcript;

pub use config::LinkConfig;
pub use link::{SerialLink, StateHandle};
pub use session_actor::SessionActor;
pub use transcript::{forward_event, Transcript};
