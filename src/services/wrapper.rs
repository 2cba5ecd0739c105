//! Draw wrapper: guards selected directives with `if $var == 0` … `endif`.
//!
//! Invariant: specs are applied in strictly descending target index, and each
//! target is re-resolved by content immediately before it is edited. An edit
//! only moves lines at or after its own position, so targets still waiting
//! (all at lower indices) keep their recorded positions; the text match
//! covers whatever drift earlier passes introduced.

use super::lexer::{self, LineKind};
use super::line_store::{LineStore, indent_of};
use crate::models::{Diagnostic, TargetRef, ToggleSpec};

/// Where a target was found, and how many lines matched its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub index: usize,
    pub candidates: usize,
}

/// Locate `target` by its trimmed text, preferring the occurrence nearest
/// the recorded index.
pub fn resolve_target(store: &LineStore, target: &TargetRef) -> Option<Resolution> {
    let wanted = target.text.trim();
    let candidates: Vec<usize> = store
        .iter()
        .enumerate()
        .filter(|(_, line)| line.trim() == wanted)
        .map(|(i, _)| i)
        .collect();

    let index = candidates
        .iter()
        .copied()
        .min_by_key(|&i| i.abs_diff(target.index))?;
    Some(Resolution {
        index,
        candidates: candidates.len(),
    })
}

#[derive(Debug, Clone, Default)]
pub struct WrapOutcome {
    /// Positions in the input slice of the specs that were applied.
    pub applied: Vec<usize>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Wrap each spec's directive in a guard block, `indent_unit` deeper than
/// the directive's own indentation.
pub fn wrap_directives(store: &mut LineStore, specs: &[ToggleSpec], indent_unit: &str) -> WrapOutcome {
    let mut outcome = WrapOutcome::default();

    let mut order: Vec<usize> = (0..specs.len()).collect();
    order.sort_by(|&a, &b| specs[b].target.index.cmp(&specs[a].target.index));

    for pos in order {
        let spec = &specs[pos];
        let Some(found) = resolve_target(store, &spec.target) else {
            tracing::warn!("Toggle target not found, skipping: {}", spec.target.text.trim());
            outcome.diagnostics.push(Diagnostic::TargetNotFound {
                directive: spec.target.text.trim().to_string(),
            });
            continue;
        };
        if found.candidates > 1 {
            outcome.diagnostics.push(Diagnostic::AmbiguousTarget {
                directive: spec.target.text.trim().to_string(),
                candidates: found.candidates,
                chosen: found.index + 1,
            });
        }

        wrap_one(store, found.index, &spec.variable, indent_unit);
        tracing::debug!("Wrapped line {} in `if ${} == 0`", found.index + 1, spec.variable);
        outcome.applied.push(pos);
    }

    outcome.applied.sort_unstable();
    outcome
}

fn wrap_one(store: &mut LineStore, index: usize, variable: &str, indent_unit: &str) {
    let directive = store.get(index).unwrap_or_default().to_string();
    let indent = indent_of(&directive).to_string();

    let comment_index = (0..index)
        .rev()
        .find(|&j| store.get(j).is_some_and(|l| !l.trim().is_empty()))
        .filter(|&j| store.get(j).is_some_and(|l| lexer::classify(l) == LineKind::Comment));

    let mut block = vec![store.line(format!("{indent}if ${variable} == 0"))];
    let insert_at = match comment_index {
        Some(c) => {
            store.remove(index);
            let comment = store.remove(c);
            block.push(store.line(format!("{indent}{indent_unit}{}", comment.trim())));
            c
        }
        None => {
            store.remove(index);
            index
        }
    };
    block.push(store.line(format!("{indent}{indent_unit}{}", directive.trim())));
    block.push(store.line(format!("{indent}endif")));

    store.insert_lines(insert_at, block);
}
