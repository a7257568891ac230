//! # Actor Runtime
//!
//! Provides the runtime infrastructure for the ScriptLink actor system.
//!
//! This crate defines:
//! - **Actor trait**: Base trait for all actors with lifecycle methods
//! - **Channel management**: Command inbox and event outbox
//! - **Cancellation**: a flag that interrupts sleeping loops
//! - **Logging**: `actor_*!` macros over `tracing`
//!
//! ## Architecture
//!
//! - **Message passing**: the UI talks to actors through typed commands
//! - **Sequential processing**: Messages are handled one at a time
//! - **Failure isolation**: Actor errors become events, they don't crash the system
//!
//! ## Example
//!
//! ```ignore
//! use actor_runtime::{spawn_actor, ChannelManager};
//!
//! let (manager, handles) = ChannelManager::new();
//! let session = SessionActor::new(/* ... */);
//! spawn_actor(session, handles.session_rx, handles.event_tx);
//!
//! manager.send_command(UiCommand::Disconnect)?;
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod actor;
pub mod cancellation;
pub mod channels;
pub mod logging;

pub use actor::{spawn_actor, Actor};
pub use cancellation::{race_with_cancellation, CancelFlag};
pub use channels::{ActorHandles, ChannelManager, EventSender};

#[doc(hidden)]
pub use tracing as __tracing;
