//! Section scanner and key-variable catalog.

use super::lexer::{self, LineKind};
use super::line_store::LineStore;
use indexmap::IndexSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Constants,
    /// `TextureOverrideComponent<N>`
    Component(u32),
    /// `Key<…>`
    Key,
    /// `CustomShaderTransparency<N>`
    Shader(u32),
    Other,
}

/// A section from its `[Name]` header up to (excluding) the next header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub kind: SectionKind,
    /// Index of the header line.
    pub header: usize,
    /// One past the last line of the section.
    pub end: usize,
}

impl Section {
    /// Body line indices, excluding the header.
    pub fn body(&self) -> std::ops::Range<usize> {
        self.header + 1..self.end
    }

    /// Index just after the last non-blank line of the section, so content
    /// inserted there keeps the section's trailing blank lines after it.
    pub fn content_end(&self, store: &LineStore) -> usize {
        (self.header + 1..self.end)
            .rev()
            .find(|&i| store.get(i).is_some_and(|l| !l.trim().is_empty()))
            .map_or(self.header + 1, |i| i + 1)
    }
}

fn section_kind(name: &str) -> SectionKind {
    if lexer::is_constants_section(name) {
        SectionKind::Constants
    } else if let Some(id) = lexer::component_id(name) {
        SectionKind::Component(id)
    } else if let Some(n) = lexer::shader_index(name) {
        SectionKind::Shader(n)
    } else if lexer::is_key_section(name) {
        SectionKind::Key
    } else {
        SectionKind::Other
    }
}

/// Locate every section in one linear pass.
pub fn scan_sections(store: &LineStore) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();

    for (i, line) in store.iter().enumerate() {
        if let LineKind::SectionHeader(name) = lexer::classify(line) {
            if let Some(prev) = sections.last_mut() {
                prev.end = i;
            }
            sections.push(Section {
                kind: section_kind(&name),
                name,
                header: i,
                end: store.len(),
            });
        }
    }

    sections
}

/// First section named `Constants`, if any.
pub fn find_constants(sections: &[Section]) -> Option<&Section> {
    sections.iter().find(|s| s.kind == SectionKind::Constants)
}

/// Variables declared cyclable (`$var = 0,1`) inside `[Key*]` sections, in
/// order of first appearance.
pub fn key_variables(store: &LineStore) -> IndexSet<String> {
    let mut found = IndexSet::new();
    let mut in_key_section = false;

    for line in store.iter() {
        match lexer::classify(line) {
            LineKind::SectionHeader(name) => in_key_section = lexer::is_key_section(&name),
            LineKind::CycleDeclaration(var) if in_key_section => {
                found.insert(var);
            }
            _ => {}
        }
    }

    tracing::debug!("Key-variable catalog: {:?}", found);
    found
}

/// Next free `CustomShaderTransparency<N>` index (max existing + 1).
pub fn next_shader_index(sections: &[Section]) -> u32 {
    sections
        .iter()
        .filter_map(|s| match s.kind {
            SectionKind::Shader(n) => Some(n),
            _ => None,
        })
        .max()
        .map_or(1, |n| n + 1)
}
