//! Draw entry parser and the top-level `scan` entry point.

use super::detector::{self, ToggleMap};
use super::lexer::{self, LineKind};
use super::line_store::LineStore;
use super::scanner::{self, Section};
use crate::models::{Diagnostic, DrawEntry, ToggleStatus};
use indexmap::IndexSet;

/// Immutable model built by one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub entries: Vec<DrawEntry>,
    pub key_variables: IndexSet<String>,
    pub sections: Vec<Section>,
    pub diagnostics: Vec<Diagnostic>,
    pub next_shader_index: u32,
}

impl ScanResult {
    pub fn count_by_status(&self, status: ToggleStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}

/// Scan raw file text.
pub fn scan(text: &str) -> ScanResult {
    scan_lines(&LineStore::from_text(text))
}

/// Scan a Line Store: sections, key catalog, toggle blocks, draw entries.
pub fn scan_lines(store: &LineStore) -> ScanResult {
    let sections = scanner::scan_sections(store);
    let key_variables = scanner::key_variables(store);
    let toggles = detector::detect_toggle_blocks(store, &key_variables);
    let entries = parse_draw_entries(store, &toggles);
    let next_shader_index = scanner::next_shader_index(&sections);

    tracing::info!(
        "Scan found {} drawindexed entries ({} simple toggles, {} complex), {} key variables",
        entries.len(),
        entries
            .iter()
            .filter(|e| e.status == ToggleStatus::ExistingSimple)
            .count(),
        entries
            .iter()
            .filter(|e| e.status == ToggleStatus::ExistingComplex)
            .count(),
        key_variables.len()
    );

    ScanResult {
        entries,
        key_variables,
        sections,
        diagnostics: toggles.diagnostics,
        next_shader_index,
    }
}

/// Collect every directive inside a component section, with the comment
/// seen most recently since the component header or the previous directive.
pub fn parse_draw_entries(store: &LineStore, toggles: &ToggleMap) -> Vec<DrawEntry> {
    let mut entries = Vec::new();
    let mut component: Option<u32> = None;
    let mut last_comment: Option<&str> = None;

    for (i, line) in store.iter().enumerate() {
        match lexer::classify(line) {
            LineKind::SectionHeader(name) => {
                component = lexer::component_id(&name);
                last_comment = None;
            }
            _ if component.is_none() => {}
            LineKind::Comment => last_comment = Some(line),
            LineKind::Directive => {
                let Some(comp) = component else { continue };
                let block = toggles.get(i).cloned();
                entries.push(DrawEntry {
                    component: comp,
                    line: i,
                    comment: last_comment.take().map(str::to_string),
                    directive: line.to_string(),
                    status: block.as_ref().map_or(ToggleStatus::None, |b| b.status),
                    block,
                });
            }
            _ => {}
        }
    }

    entries
}
