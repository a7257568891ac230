//! # Highlight
//!
//! Classifies script text into colored ranges and decides when that
//! classification runs.
//!
//! - [`tokenize`] is a pure function from text to a [`SpanSet`]
//! - [`HighlightScheduler`] coalesces edit notifications so that a burst of
//!   keystrokes costs a single tokenizer run at the next idle point

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod scheduler;
pub mod span;
pub mod tokenizer;
pub mod vocabulary;

pub use scheduler::{spawn_debounced, HighlightScheduler, SpanRenderer};
pub use span::{Span, SpanCategory, SpanSet};
pub use tokenizer::{tokenize, tokenize_with};
pub use vocabulary::Vocabulary;
