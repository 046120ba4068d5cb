// src/dialog/mod.rs
//! Glue between the classifier and the Conversation dialog: score filtering,
//! display formatting, and the context merged back into each turn.

pub mod format;
mod session;

pub use format::{filter_by_score, format_for_display, merge_context, normalize_classes};
pub use session::{DialogSession, NLC_QUERY_KEY, NLC_RESULT_KEY};
