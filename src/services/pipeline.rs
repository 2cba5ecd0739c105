//! Apply pass: runs every pending edit against a copy of the scanned lines.
//!
//! Order is fixed: unwrap, wrap, declare, transparency, prune. Unwraps run
//! in descending block order and every pending toggle target is shifted
//! through each removal, so later stages still see scan-time positions
//! translated into the current buffer.

use super::declarations;
use super::line_store::LineStore;
use super::remover::{self, Unwrapped};
use super::transparency;
use super::wrapper;
use crate::models::{ApplyReport, EngineSettings, PendingChanges, ToggleSpec, UnwrapSpec};
use indexmap::IndexMap;

/// New buffer plus what happened while producing it.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub store: LineStore,
    pub report: ApplyReport,
}

impl ApplyOutcome {
    pub fn text(&self) -> String {
        self.store.to_text()
    }
}

/// Run `pending` against `source`. The source store is left untouched.
pub fn apply(source: &LineStore, pending: &PendingChanges, settings: &EngineSettings) -> ApplyOutcome {
    let mut store = source.clone();
    let mut report = ApplyReport {
        diagnostics: pending.rejected.clone(),
        ..ApplyReport::default()
    };

    tracing::info!(
        "Applying {} toggles, {} unwraps, {} transparency edits",
        pending.toggles.len(),
        pending.unwraps.len(),
        pending.transparency.len()
    );

    let mut toggles: Vec<Option<ToggleSpec>> = pending.toggles.iter().cloned().map(Some).collect();
    run_unwraps(&mut store, pending, &mut toggles, &mut report);

    let toggles: Vec<ToggleSpec> = toggles.into_iter().flatten().collect();
    let wrapped = wrapper::wrap_directives(&mut store, &toggles, &settings.indent);
    report.wrapped = wrapped.applied.len();
    report.diagnostics.extend(wrapped.diagnostics);

    let mut bindings: IndexMap<String, String> = IndexMap::new();
    for &pos in &wrapped.applied {
        let spec = &toggles[pos];
        bindings.insert(spec.variable.clone(), spec.key.clone());
    }
    let inserted = declarations::insert_declarations(&mut store, &bindings, &settings.key_condition);
    report.declarations_added = inserted.declarations_added;
    report.key_sections_added = inserted.key_sections_added;

    let blended = transparency::apply_transparency(&mut store, &pending.transparency);
    report.transparency = blended.applied;
    report.diagnostics.extend(blended.diagnostics);

    let pruned = declarations::prune_unused(&mut store);
    report.declarations_pruned = pruned.declarations_pruned;
    report.key_sections_pruned = pruned.key_sections_pruned;

    tracing::info!("{}", report.summary());
    ApplyOutcome { store, report }
}

/// Remove explicit unwraps and the blocks toggles replace, highest first.
/// A toggle whose block could not be removed is dropped.
fn run_unwraps(
    store: &mut LineStore,
    pending: &PendingChanges,
    toggles: &mut [Option<ToggleSpec>],
    report: &mut ApplyReport,
) {
    let mut unwraps: Vec<UnwrapSpec> = Vec::new();
    let replaced = toggles.iter().flatten().filter_map(|t| {
        t.replaces.as_ref().map(|block| UnwrapSpec {
            block: block.clone(),
            directive: t.target.text.clone(),
        })
    });
    for spec in pending.unwraps.iter().cloned().chain(replaced) {
        if !unwraps.iter().any(|u| u.block.start == spec.block.start) {
            unwraps.push(spec);
        }
    }
    unwraps.sort_by(|a, b| b.block.start.cmp(&a.block.start));

    for spec in &unwraps {
        match remover::unwrap_block(store, spec) {
            Ok(done) => {
                report.unwrapped += 1;
                shift_targets(toggles, &done);
            }
            Err(diagnostic) => {
                tracing::warn!("Unwrap skipped: {}", diagnostic);
                report.diagnostics.push(diagnostic);
                for slot in toggles.iter_mut() {
                    if slot
                        .as_ref()
                        .and_then(|t| t.replaces.as_ref())
                        .is_some_and(|b| b.start == spec.block.start)
                    {
                        *slot = None;
                    }
                }
            }
        }
    }
}

fn shift_targets(toggles: &mut [Option<ToggleSpec>], done: &Unwrapped) {
    for toggle in toggles.iter_mut().flatten() {
        toggle.target.index = done.shift(toggle.target.index);
        if toggle
            .replaces
            .as_ref()
            .is_some_and(|b| b.start == done.start)
        {
            toggle.replaces = None;
        }
    }
}
