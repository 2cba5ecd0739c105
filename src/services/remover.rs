//! Existing-toggle remover: turns a simple guard block back into a bare
//! directive (plus its comment).

use super::lexer::{self, LineKind};
use super::line_store::{LineStore, indent_of};
use crate::models::{Diagnostic, ToggleStatus, UnwrapSpec};

/// Bookkeeping for one removed block, in the coordinates of the store as it
/// was just before the removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unwrapped {
    pub start: usize,
    pub end: usize,
    /// Lines written in place of the block (1 or 2).
    pub inserted: usize,
    /// New index of the bare directive.
    pub directive_index: usize,
}

impl Unwrapped {
    /// Map an index recorded before the removal to its position after it.
    pub fn shift(&self, index: usize) -> usize {
        if (self.start..=self.end).contains(&index) {
            self.directive_index
        } else if index > self.end {
            index + self.inserted - (self.end - self.start + 1)
        } else {
            index
        }
    }
}

/// Replace the recorded block with its comment and directive, dedented to
/// the guard's indentation.
///
/// Complex blocks are refused. A block whose recorded span no longer holds
/// the same guard, `endif` and directive is reported stale and left alone.
pub fn unwrap_block(store: &mut LineStore, spec: &UnwrapSpec) -> Result<Unwrapped, Diagnostic> {
    let block = &spec.block;
    if block.status != ToggleStatus::ExistingSimple {
        return Err(Diagnostic::UnsafeEdit {
            line: block.start + 1,
        });
    }

    let stale = || Diagnostic::StaleSpan {
        line: block.start + 1,
        variable: block.variable.clone(),
    };

    let guard_ok = store
        .get(block.start)
        .is_some_and(|l| lexer::classify(l) == LineKind::Guard(block.variable.clone()));
    let endif_ok = store
        .get(block.end)
        .is_some_and(|l| lexer::classify(l) == LineKind::EndIf);
    if !guard_ok || !endif_ok {
        return Err(stale());
    }

    let directive_at = (block.start + 1..block.end)
        .find(|&i| store.get(i).is_some_and(|l| lexer::classify(l) == LineKind::Directive))
        .ok_or_else(stale)?;
    let directive = store.get(directive_at).unwrap_or_default().to_string();
    if directive.trim() != spec.directive.trim() {
        return Err(stale());
    }

    let comment = (directive_at > block.start + 1)
        .then(|| store.get(directive_at - 1))
        .flatten()
        .filter(|l| lexer::classify(l) == LineKind::Comment)
        .map(str::to_string);

    let indent = store.get(block.start).map(indent_of).unwrap_or_default().to_string();
    let mut replacement = Vec::with_capacity(2);
    if let Some(comment) = &comment {
        replacement.push(store.line(format!("{indent}{}", comment.trim())));
    }
    replacement.push(store.line(format!("{indent}{}", directive.trim())));

    let inserted = replacement.len();
    store.splice(block.start..block.end + 1, replacement);

    tracing::debug!(
        "Unwrapped `if ${} == 0` at lines {}-{}",
        block.variable,
        block.start + 1,
        block.end + 1
    );

    Ok(Unwrapped {
        start: block.start,
        end: block.end,
        inserted,
        directive_index: block.start + inserted - 1,
    })
}
