//! qcomposer core - content model, drag engine, and configuration
//!
//! This crate holds the composer logic independent of any UI:
//! - Typed content modules and ordered tracks
//! - Split-at-caret and the pending insertion cursor
//! - Drop index resolution and the pointer drag state machine
//! - Composer session, presets and macro substitution
//! - Configuration management

pub mod composer;
pub mod config;
pub mod drag;
pub mod drop_target;
pub mod geometry;
pub mod ghost;
pub mod macros;
pub mod module;
pub mod presets;
pub mod split;
pub mod track;

// Re-export commonly used types
pub use composer::{ComposeResult, Composer};
pub use config::Config;
pub use drag::{DragController, DragOutcome, GestureHost, PointerKind};
pub use module::{Module, ModuleData, ModuleType};
pub use presets::Presets;
pub use track::{Track, TrackSide};
