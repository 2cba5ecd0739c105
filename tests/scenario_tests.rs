//! End-to-end tests for the scan → build → apply loop on in-memory files.
//!
//! These tests verify:
//! - Toggle block classification (simple, complex, uncataloged)
//! - Adding a toggle to a file with no Constants or Key sections
//! - Unwrapping it again and pruning the leftovers
//! - Blend override sections

use pretty_assertions::assert_eq;
use wwmi_tools::models::{BlendMode, Diagnostic, EngineSettings, PendingChanges, ToggleStatus};
use wwmi_tools::services::{LineStore, apply, build_spec, build_transparency, build_unwrap, scan, scan_lines};

const KEYED: &str = "\
[KeyX]
key = x
type = cycle
$x = 0,1

";

fn status_of(text: &str) -> Vec<ToggleStatus> {
    scan(text).entries.iter().map(|e| e.status).collect()
}

#[test]
fn test_classification_simple() {
    let text = format!("{KEYED}[TextureOverrideComponent0]\nif $x == 0\ndrawindexed=1,2,3\nendif\n");
    assert_eq!(status_of(&text), [ToggleStatus::ExistingSimple]);
}

#[test]
fn test_classification_complex_with_extra_directive() {
    let text = format!(
        "{KEYED}[TextureOverrideComponent0]\nif $x == 0\ndrawindexed=1,2,3\ndrawindexed=4,5,6\nendif\n"
    );
    assert_eq!(
        status_of(&text),
        [ToggleStatus::ExistingComplex, ToggleStatus::ExistingComplex]
    );
}

#[test]
fn test_classification_complex_with_mixed_content() {
    let text = format!(
        "{KEYED}[TextureOverrideComponent0]\nif $x == 0\nib = null\ndrawindexed=1,2,3\nendif\n"
    );
    assert_eq!(status_of(&text), [ToggleStatus::ExistingComplex]);
}

#[test]
fn test_classification_uncataloged_variable() {
    let text = "[TextureOverrideComponent0]\nif $x == 0\ndrawindexed=1,2,3\nendif\n";
    assert_eq!(status_of(text), [ToggleStatus::None]);
}

#[test]
fn test_unmatched_guard_reported_not_fatal() {
    let text = format!(
        "{KEYED}[TextureOverrideComponent0]\nif $x == 0\ndrawindexed=1,2,3\n[TextureOverrideComponent1]\ndrawindexed=4,5,6\n"
    );
    let result = scan(&text);
    assert_eq!(result.entries.len(), 2);
    assert!(result.entries.iter().all(|e| e.status == ToggleStatus::None));
    assert!(matches!(
        result.diagnostics.as_slice(),
        [Diagnostic::MalformedSpan { line: 7, .. }]
    ));
}

const SCENARIO: &str = "\
[TextureOverrideComponent0]
; head
drawindexed = 0, 100, 0
";

const SCENARIO_TOGGLED: &str = "\
[Constants]
global persist $hide_head = 0

[Keyhide_head]
condition = $object_detected
key = h
type = cycle
$hide_head = 0,1

[TextureOverrideComponent0]
if $hide_head == 0
    ; head
    drawindexed = 0, 100, 0
endif
";

#[test]
fn test_scenario_add_toggle() {
    let store = LineStore::from_text(SCENARIO);
    let result = scan_lines(&store);
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].comment_text(), "head");

    let mut pending = PendingChanges::new();
    pending.push_toggle(build_spec(&result.entries[0], "hide_head", "h").unwrap());
    let outcome = apply(&store, &pending, &EngineSettings::default());

    assert_eq!(outcome.text(), SCENARIO_TOGGLED);
    assert_eq!(outcome.report.wrapped, 1);
    assert_eq!(outcome.report.declarations_added, ["hide_head"]);
    assert_eq!(outcome.report.key_sections_added, ["hide_head"]);
    assert!(outcome.report.diagnostics.is_empty());
}

#[test]
fn test_scenario_unwrap_and_prune() {
    let store = LineStore::from_text(SCENARIO_TOGGLED);
    let result = scan_lines(&store);
    assert_eq!(result.entries[0].status, ToggleStatus::ExistingSimple);

    let mut pending = PendingChanges::new();
    pending.push_unwrap(build_unwrap(&result.entries[0]).unwrap());
    let outcome = apply(&store, &pending, &EngineSettings::default());

    assert_eq!(
        outcome.text(),
        "[Constants]\n\n[TextureOverrideComponent0]\n; head\ndrawindexed = 0, 100, 0\n"
    );
    assert_eq!(outcome.report.unwrapped, 1);
    assert_eq!(outcome.report.declarations_pruned, ["hide_head"]);
    assert_eq!(outcome.report.key_sections_pruned, ["Keyhide_head"]);
}

#[test]
fn test_scenario_texture_alpha() {
    let store = LineStore::from_text(SCENARIO);
    let result = scan_lines(&store);

    let mut pending = PendingChanges::new();
    pending.push_transparency(
        build_transparency(&result.entries[0], BlendMode::TextureAlpha, result.next_shader_index).unwrap(),
    );
    let outcome = apply(&store, &pending, &EngineSettings::default());

    assert_eq!(
        outcome.text(),
        "\
[TextureOverrideComponent0]
; head
; drawindexed = 0, 100, 0
run = CustomShaderTransparency1

[CustomShaderTransparency1]
; head
blend = ADD SRC_ALPHA INV_SRC_ALPHA
drawindexed = 0, 100, 0
"
    );
    assert_eq!(outcome.report.transparency, 1);
}

#[test]
fn test_complex_block_rejected_rest_of_batch_applies() {
    let text = format!(
        "{KEYED}[TextureOverrideComponent0]\nif $x == 0\nib = null\ndrawindexed = 1, 2, 3\nendif\n[TextureOverrideComponent1]\ndrawindexed = 4, 5, 6\n"
    );
    let store = LineStore::from_text(&text);
    let result = scan_lines(&store);

    assert!(build_spec(&result.entries[0], "y", "y").is_err());
    assert!(build_unwrap(&result.entries[0]).is_err());

    let mut pending = PendingChanges::new();
    pending.push_toggle(build_spec(&result.entries[1], "hide_legs", "l").unwrap());
    let outcome = apply(&store, &pending, &EngineSettings::default());

    assert_eq!(outcome.report.wrapped, 1);
    let out = outcome.text();
    assert!(out.contains("if $x == 0\nib = null\ndrawindexed = 1, 2, 3\nendif\n"));
    assert!(out.contains("if $hide_legs == 0\n    drawindexed = 4, 5, 6\nendif\n"));
}

#[test]
fn test_crlf_and_bom_survive_apply() {
    let text = "\u{feff}[TextureOverrideComponent0]\r\n; head\r\ndrawindexed = 0, 100, 0\r\n";
    let store = LineStore::from_text(text);
    let result = scan_lines(&store);

    let mut pending = PendingChanges::new();
    pending.push_toggle(build_spec(&result.entries[0], "hide_head", "h").unwrap());
    let out = apply(&store, &pending, &EngineSettings::default()).text();

    assert!(out.starts_with("\u{feff}[Constants]\r\n"));
    assert!(!out.replace("\r\n", "").contains('\n'));
}

#[test]
fn test_untouched_content_is_byte_identical() {
    let text = "\
; generated by a tool
[TextureOverrideComponent0]
  ; head
  drawindexed = 0, 100, 0
[ResourceWeird]
filename =   Textures/odd name.dds
\t; tabbed comment
drawindexed = 7, 7, 7
";
    let store = LineStore::from_text(text);
    let result = scan_lines(&store);

    let mut pending = PendingChanges::new();
    pending.push_toggle(build_spec(&result.entries[0], "hide_head", "h").unwrap());
    let out = apply(&store, &pending, &EngineSettings::default()).text();

    assert!(out.contains("[ResourceWeird]\nfilename =   Textures/odd name.dds\n\t; tabbed comment\ndrawindexed = 7, 7, 7\n"));
    assert!(out.contains("; generated by a tool\n"));
    assert!(out.contains("  if $hide_head == 0\n      ; head\n      drawindexed = 0, 100, 0\n  endif\n"));
}

#[test]
fn test_compound_guard_survives_unrelated_toggle() {
    let text = "\
[Constants]
global persist $swap = 0

[KeySwap]
key = s
type = cycle
$swap = 0,1

[TextureOverrideComponent0]
if $swap == 0 && $object_detected == 1
    drawindexed = 1, 2, 3
endif

[TextureOverrideComponent1]
drawindexed = 4, 5, 6
";
    let store = LineStore::from_text(text);
    let result = scan_lines(&store);
    let mut pending = PendingChanges::new();
    pending.push_toggle(build_spec(&result.entries[1], "hide_body", "b").unwrap());

    let outcome = apply(&store, &pending, &EngineSettings::default());
    let out = outcome.text();

    assert_eq!(outcome.report.wrapped, 1);
    assert!(outcome.report.declarations_pruned.is_empty());
    assert!(outcome.report.key_sections_pruned.is_empty());
    assert!(out.contains("global persist $swap = 0\n"));
    assert!(out.contains("[KeySwap]\nkey = s\ntype = cycle\n$swap = 0,1\n"));
    assert!(out.contains("if $swap == 0 && $object_detected == 1\n"));
}

#[test]
fn test_empty_pass_keeps_guard_with_trailing_comment() {
    let text = "\
[Constants]
global persist $h = 0

[KeyH]
key = h
type = cycle
$h = 0,1

[TextureOverrideComponent0]
if $h == 0 ; hide head
    drawindexed = 0, 100, 0
endif
";
    let store = LineStore::from_text(text);
    let outcome = apply(&store, &PendingChanges::new(), &EngineSettings::default());

    assert!(!outcome.report.has_changes());
    assert_eq!(outcome.text(), text);
}

#[test]
fn test_cycle_line_with_comment_is_cataloged() {
    let text = "\
[KeyX]
key = x
type = cycle
$x = 0,1 ; toggles the hat

[TextureOverrideComponent0]
if $x == 0
drawindexed = 1, 2, 3
endif
";
    let result = scan(text);
    assert!(result.key_variables.contains("x"));
    assert_eq!(status_of(text), [ToggleStatus::ExistingSimple]);
}
