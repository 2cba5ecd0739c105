//! Toggle block detection and classification.
//!
//! A block is `if $var == 0` … `endif` inside a single section. Only blocks
//! that guard at least one directive with a cataloged cycle variable are
//! reported; everything else is ordinary conditional logic and is ignored.

use super::lexer::{self, LineKind};
use super::line_store::LineStore;
use crate::models::{Diagnostic, ToggleBlock, ToggleStatus};
use indexmap::IndexSet;
use std::collections::BTreeMap;

/// Classified blocks keyed by the index of each directive they guard.
#[derive(Debug, Clone, Default)]
pub struct ToggleMap {
    pub by_directive: BTreeMap<usize, ToggleBlock>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ToggleMap {
    pub fn get(&self, directive_index: usize) -> Option<&ToggleBlock> {
        self.by_directive.get(&directive_index)
    }
}

/// Detect toggle blocks in `store`, classifying them against `key_vars`.
pub fn detect_toggle_blocks(store: &LineStore, key_vars: &IndexSet<String>) -> ToggleMap {
    let kinds: Vec<LineKind> = store.iter().map(lexer::classify).collect();
    let mut map = ToggleMap::default();
    let mut i = 0;

    while i < kinds.len() {
        let LineKind::Guard(variable) = &kinds[i] else {
            i += 1;
            continue;
        };

        let Some(end) = find_endif(&kinds, i) else {
            tracing::debug!("Unmatched guard for ${} at line {}", variable, i + 1);
            map.diagnostics.push(Diagnostic::MalformedSpan {
                line: i + 1,
                variable: variable.clone(),
            });
            i += 1;
            continue;
        };

        let mut directives = Vec::new();
        let mut mixed = false;
        for (k, kind) in kinds.iter().enumerate().take(end).skip(i + 1) {
            match kind {
                LineKind::Directive => directives.push(k),
                kind if kind.is_statement() => mixed = true,
                _ => {}
            }
        }

        if directives.is_empty() || !key_vars.contains(variable) {
            i = end + 1;
            continue;
        }

        let status = if !mixed && directives.len() == 1 {
            ToggleStatus::ExistingSimple
        } else {
            ToggleStatus::ExistingComplex
        };
        let block = ToggleBlock {
            variable: variable.clone(),
            start: i,
            end,
            status,
        };
        tracing::debug!(
            "Toggle block ${} at lines {}-{}: {:?}",
            block.variable,
            block.start + 1,
            block.end + 1,
            status
        );
        for k in directives {
            map.by_directive.insert(k, block.clone());
        }

        i = end + 1;
    }

    map
}

/// Index of the `endif` closing the guard at `start`, unless a section header
/// comes first.
fn find_endif(kinds: &[LineKind], start: usize) -> Option<usize> {
    for (j, kind) in kinds.iter().enumerate().skip(start + 1) {
        match kind {
            LineKind::EndIf => return Some(j),
            LineKind::SectionHeader(_) => return None,
            _ => {}
        }
    }
    None
}
