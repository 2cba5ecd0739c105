use std::fmt;

/// Classification of a draw directive with respect to an existing toggle guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToggleStatus {
    /// Not inside a recognised toggle block.
    #[default]
    None,
    /// The only statement of an `if $var == 0 … endif` block whose variable
    /// has a cycle key. Safe to unwrap or replace automatically.
    ExistingSimple,
    /// Shares its block with other statements or directives. Surfaced to the
    /// operator but never edited automatically.
    ExistingComplex,
}

impl ToggleStatus {
    /// Short list marker used by front ends (`[E]` / `[M]`).
    pub fn marker(self) -> &'static str {
        match self {
            ToggleStatus::None => "",
            ToggleStatus::ExistingSimple => "[E] ",
            ToggleStatus::ExistingComplex => "[M] ",
        }
    }
}

/// A matched `if $var == 0` … `endif` span. Indices are inclusive and refer to
/// the Line Store the block was detected in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToggleBlock {
    pub variable: String,
    pub start: usize,
    pub end: usize,
    pub status: ToggleStatus,
}

/// One draw directive found inside a `TextureOverrideComponent<N>` section.
///
/// `comment` and `directive` hold the raw lines, terminators included, exactly
/// as they appear in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawEntry {
    pub component: u32,
    pub line: usize,
    pub comment: Option<String>,
    pub directive: String,
    pub status: ToggleStatus,
    pub block: Option<ToggleBlock>,
}

impl DrawEntry {
    /// Comment text without the leading `;` and surrounding whitespace.
    pub fn comment_text(&self) -> &str {
        self.comment
            .as_deref()
            .map(|c| c.trim().trim_start_matches(';').trim())
            .unwrap_or("")
    }

    /// Guard variable when the directive sits inside a recognised block.
    pub fn variable(&self) -> Option<&str> {
        self.block.as_ref().map(|b| b.variable.as_str())
    }
}

impl fmt::Display for DrawEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}C{} | L{} | {} | {}",
            self.status.marker(),
            self.component,
            self.line + 1,
            self.comment_text(),
            self.directive.trim()
        )
    }
}

/// The three integer arguments of a parameterized `drawindexed = A, B, C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawParams(pub u64, pub u64, pub u64);

impl fmt::Display for DrawParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.0, self.1, self.2)
    }
}
