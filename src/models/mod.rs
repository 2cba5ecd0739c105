//! Data models for the WWMI toolkit.
//!
//! - [`DrawEntry`]: a `drawindexed` directive inside a component section, with its
//!   attached comment and toggle classification
//! - [`ToggleBlock`] / [`ToggleStatus`]: an existing `if $var == 0 … endif` guard
//! - [`ToggleSpec`], [`UnwrapSpec`], [`TransparencySpec`]: pending edits, collected in
//!   [`PendingChanges`] between a scan and an apply
//! - [`ApplyReport`] / [`Diagnostic`]: what an apply did, skipped or refused
//! - [`EngineSettings`]: user settings loaded by [`ConfigManager`](crate::config::ConfigManager)

pub mod changes;
pub mod config;
pub mod entry;
pub mod report;

pub use changes::{BlendMode, PendingChanges, TargetRef, ToggleSpec, TransparencySpec, UnwrapSpec};
pub use config::EngineSettings;
pub use entry::{DrawEntry, DrawParams, ToggleBlock, ToggleStatus};
pub use report::{ApplyReport, Diagnostic};
