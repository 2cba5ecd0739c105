//! Property tests for the apply pipeline.
//!
//! Generated files are built from a handful of component sections, each with
//! optional comments, mixed indentation and either line ending.

use proptest::prelude::*;
use wwmi_tools::models::{EngineSettings, PendingChanges, ToggleStatus};
use wwmi_tools::services::declarations::{guarded_variables, prune_unused};
use wwmi_tools::services::lexer::{self, LineKind};
use wwmi_tools::services::scanner::{SectionKind, scan_sections};
use wwmi_tools::services::{LineStore, apply, build_spec, build_unwrap, scan_lines};

#[derive(Debug, Clone)]
struct Draw {
    comment: Option<String>,
    params: (u32, u32, u32),
}

#[derive(Debug, Clone)]
struct Component {
    indent: &'static str,
    draws: Vec<Draw>,
}

fn draw_strategy() -> impl Strategy<Value = Draw> {
    (
        proptest::option::of("[a-z]{1,8}( [a-z]{1,8})?"),
        (0u32..5000, 1u32..5000, 0u32..3),
    )
        .prop_map(|(comment, params)| Draw { comment, params })
}

fn component_strategy() -> impl Strategy<Value = Component> {
    (
        prop_oneof![Just(""), Just("  "), Just("    "), Just("\t")],
        prop::collection::vec(draw_strategy(), 1..4),
    )
        .prop_map(|(indent, draws)| Component { indent, draws })
}

fn render(components: &[Component], crlf: bool) -> String {
    let nl = if crlf { "\r\n" } else { "\n" };
    let mut out = format!("[Constants]{nl}{nl}");
    for (id, component) in components.iter().enumerate() {
        out.push_str(&format!("[TextureOverrideComponent{id}]{nl}"));
        for draw in &component.draws {
            if let Some(comment) = &draw.comment {
                out.push_str(&format!("{}; {}{nl}", component.indent, comment));
            }
            let (a, b, c) = draw.params;
            out.push_str(&format!("{}drawindexed = {a}, {b}, {c}{nl}", component.indent));
        }
        out.push_str(nl);
    }
    out
}

fn file_strategy() -> impl Strategy<Value = String> {
    (prop::collection::vec(component_strategy(), 1..4), any::<bool>())
        .prop_map(|(components, crlf)| render(&components, crlf))
}

fn variable_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("hide_a".to_string()),
        Just("hide_b".to_string()),
        Just("toggle_c".to_string()),
    ]
}

/// Every `global persist $v` in Constants and every cycle variable in a Key
/// section is still referenced by a guard.
fn assert_closed(store: &LineStore) {
    let used = guarded_variables(store);
    for section in scan_sections(store) {
        let wanted = match section.kind {
            SectionKind::Constants | SectionKind::Key => section.kind,
            _ => continue,
        };
        for i in section.body() {
            match (wanted, lexer::classify(store.get(i).unwrap())) {
                (SectionKind::Constants, LineKind::Declaration(var))
                | (SectionKind::Key, LineKind::CycleDeclaration(var)) => {
                    assert!(used.contains(&var), "${var} declared but never guarded");
                }
                _ => {}
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_prune_is_idempotent(
        text in file_strategy(),
        picks in prop::collection::vec((any::<prop::sample::Index>(), variable_strategy()), 0..4),
        unwrap_after in any::<bool>(),
    ) {
        let store = LineStore::from_text(&text);
        let result = scan_lines(&store);
        let mut pending = PendingChanges::new();
        for (pick, var) in &picks {
            let entry = &result.entries[pick.index(result.entries.len())];
            pending.push_toggle(build_spec(entry, var, "k").unwrap());
        }
        let mut once = apply(&store, &pending, &EngineSettings::default()).store;

        if unwrap_after {
            let rescanned = scan_lines(&once);
            let mut pending = PendingChanges::new();
            for entry in rescanned.entries.iter().filter(|e| e.status == ToggleStatus::ExistingSimple).take(1) {
                pending.push_unwrap(build_unwrap(entry).unwrap());
            }
            once = apply(&once, &pending, &EngineSettings::default()).store;
        }

        let mut twice = once.clone();
        let outcome = prune_unused(&mut twice);
        prop_assert_eq!(twice.to_text(), once.to_text());
        prop_assert!(outcome.declarations_pruned.is_empty());
        prop_assert!(outcome.key_sections_pruned.is_empty());
    }

    #[test]
    fn prop_wrap_then_unwrap_restores_text(
        text in file_strategy(),
        pick in any::<prop::sample::Index>(),
        var in variable_strategy(),
    ) {
        let store = LineStore::from_text(&text);
        let result = scan_lines(&store);
        let entry = &result.entries[pick.index(result.entries.len())];

        let mut pending = PendingChanges::new();
        pending.push_toggle(build_spec(entry, &var, "k").unwrap());
        let wrapped = apply(&store, &pending, &EngineSettings::default());
        prop_assert_eq!(wrapped.report.wrapped, 1);

        let rescanned = scan_lines(&wrapped.store);
        let toggled: Vec<_> = rescanned
            .entries
            .iter()
            .filter(|e| e.status == ToggleStatus::ExistingSimple)
            .collect();
        prop_assert_eq!(toggled.len(), 1);
        prop_assert_eq!(toggled[0].directive.trim(), entry.directive.trim());

        let mut pending = PendingChanges::new();
        pending.push_unwrap(build_unwrap(toggled[0]).unwrap());
        let restored = apply(&wrapped.store, &pending, &EngineSettings::default());
        prop_assert_eq!(restored.text(), text);
    }

    #[test]
    fn prop_apply_leaves_declarations_closed(
        text in file_strategy(),
        picks in prop::collection::vec((any::<prop::sample::Index>(), variable_strategy()), 1..5),
        unwraps in prop::collection::vec(any::<prop::sample::Index>(), 0..3),
    ) {
        let store = LineStore::from_text(&text);
        let result = scan_lines(&store);
        let mut pending = PendingChanges::new();
        for (pick, var) in &picks {
            let entry = &result.entries[pick.index(result.entries.len())];
            pending.push_toggle(build_spec(entry, var, "k").unwrap());
        }
        let first = apply(&store, &pending, &EngineSettings::default());
        assert_closed(&first.store);

        let rescanned = scan_lines(&first.store);
        let simple: Vec<_> = rescanned
            .entries
            .iter()
            .filter(|e| e.status == ToggleStatus::ExistingSimple)
            .collect();
        let mut pending = PendingChanges::new();
        if !simple.is_empty() {
            for pick in &unwraps {
                pending.push_unwrap(build_unwrap(simple[pick.index(simple.len())]).unwrap());
            }
        }
        let second = apply(&first.store, &pending, &EngineSettings::default());
        assert_closed(&second.store);
        prop_assert!(second.report.diagnostics.iter().all(|d| !d.is_skip()));
    }
}
