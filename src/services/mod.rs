//! Services module - the block engine for WWMI `mod.ini` files.
//!
//! Everything here is pure: it takes text or a [`LineStore`] and returns new
//! text plus structured findings. File I/O and backups live in
//! [`crate::state`], so every stage can be tested on in-memory strings.
//!
//! # Components
//!
//! - [`LineStore`]: ordered lines with their own terminators; untouched lines
//!   serialize back byte-for-byte.
//! - [`lexer`]: classifies a single line (header, guard, `endif`, directive,
//!   declaration, cycle declaration, comment).
//! - [`scanner`]: section boundaries and the key-variable catalog.
//! - [`detector`]: finds `if $var == 0` … `endif` blocks around directives and
//!   classifies them simple or complex.
//! - [`parser`]: draw entries with their attached comments; [`scan`] runs the
//!   whole read side.
//! - [`spec_builder`]: validates an operator selection into a pending edit.
//! - [`remover`], [`wrapper`], [`declarations`], [`transparency`]: the
//!   mutators.
//! - [`pipeline`]: [`apply`] runs the mutators in order against a copy.
//!
//! # Usage Example
//!
//! ```ignore
//! use wwmi_tools::services::{apply, build_spec, scan_lines, LineStore};
//! use wwmi_tools::models::{EngineSettings, PendingChanges};
//!
//! let store = LineStore::from_text(&text);
//! let result = scan_lines(&store);
//!
//! let mut pending = PendingChanges::new();
//! pending.push_toggle(build_spec(&result.entries[0], "hide_head", "h")?);
//!
//! let outcome = apply(&store, &pending, &EngineSettings::default());
//! println!("{}", outcome.report.summary());
//! ```

pub mod declarations;
pub mod detector;
pub mod lexer;
pub mod line_store;
pub mod parser;
pub mod pipeline;
pub mod remover;
pub mod scanner;
pub mod spec_builder;
pub mod transparency;
pub mod wrapper;

pub use line_store::{LineEnding, LineStore};
pub use parser::{ScanResult, scan, scan_lines};
pub use pipeline::{ApplyOutcome, apply};
pub use spec_builder::{SpecError, build_spec, build_transparency, build_unwrap};
