//! Line classifier for the mod.ini dialect.
//!
//! Every line is classified on its own into a [`LineKind`]; the scanner,
//! detector and mutators consume these tokens instead of re-matching raw
//! text. Keywords are case-insensitive.

use crate::models::DrawParams;
use regex::Regex;
use std::sync::LazyLock;

/// Token for a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    /// `[Name]`, carrying `Name`.
    SectionHeader(String),
    /// `if $var == 0`
    Guard(String),
    EndIf,
    /// Any non-comment line containing `drawindexed`.
    Directive,
    /// `global persist $var = …`
    Declaration(String),
    /// `$var = 0,1`
    CycleDeclaration(String),
    Other,
}

impl LineKind {
    pub fn is_header(&self) -> bool {
        matches!(self, LineKind::SectionHeader(_))
    }

    /// Blank lines and comments carry no statement.
    pub fn is_statement(&self) -> bool {
        !matches!(self, LineKind::Blank | LineKind::Comment)
    }
}

struct Patterns {
    guard: Regex,
    guard_reference: Regex,
    declaration: Regex,
    cycle: Regex,
    draw_params: Regex,
    component: Regex,
    shader: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    guard: Regex::new(r"(?i)^if\s+\$(\w+)\s*==\s*0\s*$").expect("Invalid guard regex"),
    guard_reference: Regex::new(r"(?i)\bif\s+\$(\w+)\s*==\s*0\b").expect("Invalid guard reference regex"),
    declaration: Regex::new(r"(?i)^global\s+persist\s+\$(\w+)\b").expect("Invalid declaration regex"),
    cycle: Regex::new(r"^\$(\w+)\s*=\s*0\s*,\s*1\s*(?:;.*)?$").expect("Invalid cycle regex"),
    draw_params: Regex::new(r"(?i)^drawindexed\s*=\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*$")
        .expect("Invalid drawindexed regex"),
    component: Regex::new(r"(?i)^TextureOverrideComponent(\d+)$").expect("Invalid component regex"),
    shader: Regex::new(r"(?i)^CustomShaderTransparency(\d+)$").expect("Invalid shader regex"),
});

/// Classify one raw line (terminator allowed).
pub fn classify(line: &str) -> LineKind {
    let s = line.trim();
    if s.is_empty() {
        return LineKind::Blank;
    }
    if s.starts_with(';') {
        return LineKind::Comment;
    }
    if let Some(name) = header_name(s) {
        return LineKind::SectionHeader(name.to_string());
    }

    let patterns = &*PATTERNS;
    if let Some(caps) = patterns.guard.captures(s) {
        return LineKind::Guard(caps[1].to_string());
    }
    if s.eq_ignore_ascii_case("endif") {
        return LineKind::EndIf;
    }
    if s.to_ascii_lowercase().contains("drawindexed") {
        return LineKind::Directive;
    }
    if let Some(caps) = patterns.declaration.captures(s) {
        return LineKind::Declaration(caps[1].to_string());
    }
    if let Some(caps) = patterns.cycle.captures(s) {
        return LineKind::CycleDeclaration(caps[1].to_string());
    }
    LineKind::Other
}

/// Variables compared against zero by any `if` on the line, including
/// compound conditions. Text after `;` is ignored.
pub fn guard_references(line: &str) -> Vec<String> {
    let code = line.split(';').next().unwrap_or_default();
    PATTERNS
        .guard_reference
        .captures_iter(code)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Section name for a trimmed `[Name]` line.
fn header_name(trimmed: &str) -> Option<&str> {
    trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
}

/// Parameters of the exact `drawindexed = A, B, C` form.
pub fn parse_draw_params(line: &str) -> Option<DrawParams> {
    let caps = PATTERNS.draw_params.captures(line.trim())?;
    Some(DrawParams(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    ))
}

/// `N` of a `TextureOverrideComponent<N>` section name.
pub fn component_id(section: &str) -> Option<u32> {
    PATTERNS.component.captures(section)?[1].parse().ok()
}

/// `N` of a `CustomShaderTransparency<N>` section name.
pub fn shader_index(section: &str) -> Option<u32> {
    PATTERNS.shader.captures(section)?[1].parse().ok()
}

/// Section names starting with `key` (any case) are key-binding sections.
pub fn is_key_section(section: &str) -> bool {
    section
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("key"))
}

pub fn is_constants_section(section: &str) -> bool {
    section.eq_ignore_ascii_case("constants")
}

/// A variable name usable as `$<name>`.
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}
