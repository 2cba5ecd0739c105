//! Declaration inserter and unused-declaration pruner.
//!
//! Every guarded variable needs a `global persist $var = 0` in `[Constants]`
//! and a `[Key<Var>]` cycle section. The pruner removes both once no
//! `if $var == 0` references the variable any more.

use super::lexer::{self, LineKind};
use super::line_store::LineStore;
use super::scanner::{self, SectionKind};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub declarations_added: Vec<String>,
    pub key_sections_added: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    pub declarations_pruned: Vec<String>,
    pub key_sections_pruned: Vec<String>,
}

/// Ensure each variable in `bindings` (variable -> key, in queue order) has a
/// persisted declaration and a cycle key section. Existing declarations are
/// never duplicated.
pub fn insert_declarations(
    store: &mut LineStore,
    bindings: &IndexMap<String, String>,
    key_condition: &str,
) -> InsertOutcome {
    let mut outcome = InsertOutcome::default();
    if bindings.is_empty() {
        return outcome;
    }

    outcome.declarations_added = insert_persist_declarations(store, bindings);
    outcome.key_sections_added = insert_key_sections(store, bindings, key_condition);

    tracing::info!(
        "Declarations added: {:?}, key sections added: {:?}",
        outcome.declarations_added,
        outcome.key_sections_added
    );
    outcome
}

fn insert_persist_declarations(store: &mut LineStore, bindings: &IndexMap<String, String>) -> Vec<String> {
    let sections = scanner::scan_sections(store);

    let Some(constants) = scanner::find_constants(&sections) else {
        let added: Vec<String> = bindings.keys().cloned().collect();
        let mut block = vec![store.line("[Constants]")];
        block.extend(added.iter().map(|var| store.line(format!("global persist ${var} = 0"))));
        block.push(store.line(""));
        store.insert_lines(0, block);
        return added;
    };

    let existing: HashSet<String> = constants
        .body()
        .filter_map(|i| match store.get(i).map(lexer::classify) {
            Some(LineKind::Declaration(var)) => Some(var),
            _ => None,
        })
        .collect();

    let added: Vec<String> = bindings
        .keys()
        .filter(|var| !existing.contains(*var))
        .cloned()
        .collect();
    let lines = added
        .iter()
        .map(|var| store.line(format!("global persist ${var} = 0")))
        .collect();
    let at = constants.content_end(store);
    store.insert_lines(at, lines);
    added
}

fn insert_key_sections(
    store: &mut LineStore,
    bindings: &IndexMap<String, String>,
    key_condition: &str,
) -> Vec<String> {
    let mut bound: HashSet<String> = HashSet::new();
    for line in store.iter() {
        match lexer::classify(line) {
            LineKind::SectionHeader(name) if lexer::is_key_section(&name) => {
                bound.insert(name[3..].to_string());
            }
            LineKind::CycleDeclaration(var) => {
                bound.insert(var);
            }
            _ => {}
        }
    }

    let sections = scanner::scan_sections(store);
    let anchor = sections
        .iter()
        .rev()
        .find(|s| s.kind == SectionKind::Key)
        .or_else(|| scanner::find_constants(&sections));
    let insert_at = anchor.map_or(0, |s| s.content_end(store));

    let mut added = Vec::new();
    let mut lines = Vec::new();
    for (var, key) in bindings {
        if bound.contains(var) {
            continue;
        }
        lines.push(store.line(""));
        lines.push(store.line(format!("[Key{var}]")));
        lines.push(store.line(format!("condition = {key_condition}")));
        lines.push(store.line(format!("key = {key}")));
        lines.push(store.line("type = cycle"));
        lines.push(store.line(format!("${var} = 0,1")));
        added.push(var.clone());
    }

    store.insert_lines(insert_at, lines);
    added
}

/// Variables tested by at least one `if $var == 0` anywhere in the store.
///
/// Compound conditions and trailing comments count, so a declaration is kept
/// for any live reference, not only for the guards the detector recognizes.
pub fn guarded_variables(store: &LineStore) -> IndexSet<String> {
    store
        .iter()
        .filter(|line| lexer::classify(line) != LineKind::Comment)
        .flat_map(lexer::guard_references)
        .collect()
}

/// Remove `global persist` lines from `[Constants]`, and whole `[Key*]`
/// sections, whose variables no longer guard anything. Key sections without
/// a `$var = 0,1` line are left alone.
pub fn prune_unused(store: &mut LineStore) -> PruneOutcome {
    let used = guarded_variables(store);
    let mut outcome = PruneOutcome::default();

    let sections = scanner::scan_sections(store);
    let constants: Vec<_> = sections
        .iter()
        .filter(|s| s.kind == SectionKind::Constants)
        .collect();
    for section in constants.iter().rev() {
        for i in section.body().rev() {
            if let Some(LineKind::Declaration(var)) = store.get(i).map(lexer::classify) {
                if !used.contains(&var) {
                    store.remove(i);
                    outcome.declarations_pruned.push(var);
                }
            }
        }
    }

    let sections = scanner::scan_sections(store);
    for section in sections.iter().rev().filter(|s| s.kind == SectionKind::Key) {
        let cycle_vars: Vec<String> = section
            .body()
            .filter_map(|i| match store.get(i).map(lexer::classify) {
                Some(LineKind::CycleDeclaration(var)) => Some(var),
                _ => None,
            })
            .collect();
        if !cycle_vars.is_empty() && cycle_vars.iter().all(|v| !used.contains(v)) {
            store.remove_range(section.header..section.end);
            outcome.key_sections_pruned.push(section.name.clone());
        }
    }

    outcome.declarations_pruned.reverse();
    outcome.key_sections_pruned.reverse();
    if !outcome.declarations_pruned.is_empty() || !outcome.key_sections_pruned.is_empty() {
        tracing::info!(
            "Pruned declarations: {:?}, key sections: {:?}",
            outcome.declarations_pruned,
            outcome.key_sections_pruned
        );
    }
    outcome
}
