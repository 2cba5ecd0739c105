// WWMI Tools - toggle and transparency patcher for WWMI mod.ini files
//
// This is the library crate containing the block engine and its data model.
// The binary crate (main.rs) provides the command-line front end.

pub mod config;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{ApplyReport, Diagnostic, DrawEntry, EngineSettings, PendingChanges};
pub use services::{LineStore, ScanResult, apply, scan};
pub use state::{DiskStore, EditSession, FileStore, SessionError};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
