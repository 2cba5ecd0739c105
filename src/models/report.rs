use thiserror::Error;

/// Non-fatal findings from scanning or applying.
///
/// None of these abort a scan or an apply. They are collected so a front end
/// can tell the operator what was skipped and why. Line numbers are 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// `if $var == 0` with no `endif` before the next section header.
    #[error("line {line}: `if ${variable} == 0` has no matching endif in its section")]
    MalformedSpan { line: usize, variable: String },

    /// The directive a pending edit points at no longer exists. The edit was
    /// skipped.
    #[error("directive `{directive}` not found; edit skipped")]
    TargetNotFound { directive: String },

    /// Several identical directives matched; the one nearest the recorded
    /// position was used.
    #[error("directive `{directive}` matched {candidates} lines; used line {chosen}")]
    AmbiguousTarget {
        directive: String,
        candidates: usize,
        chosen: usize,
    },

    /// An edit targeted a complex toggle block and was refused.
    #[error("line {line}: toggle block is complex; left untouched")]
    UnsafeEdit { line: usize },

    /// A recorded `if`/`endif` span no longer matches the text it was
    /// detected in. The unwrap was skipped.
    #[error("line {line}: toggle block for ${variable} changed since scan; unwrap skipped")]
    StaleSpan { line: usize, variable: String },
}

impl Diagnostic {
    /// True when the diagnostic means a requested edit did not happen.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Diagnostic::TargetNotFound { .. }
                | Diagnostic::UnsafeEdit { .. }
                | Diagnostic::StaleSpan { .. }
        )
    }
}

/// Structured result of one apply pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub unwrapped: usize,
    pub wrapped: usize,
    pub transparency: usize,
    pub declarations_added: Vec<String>,
    pub key_sections_added: Vec<String>,
    pub declarations_pruned: Vec<String>,
    pub key_sections_pruned: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ApplyReport {
    /// Number of requested edits that were skipped or rejected.
    pub fn skipped(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_skip()).count()
    }

    /// Number of edits refused because their block is complex.
    pub fn rejected(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::UnsafeEdit { .. }))
            .count()
    }

    pub fn has_changes(&self) -> bool {
        self.unwrapped > 0
            || self.wrapped > 0
            || self.transparency > 0
            || !self.declarations_added.is_empty()
            || !self.key_sections_added.is_empty()
            || !self.declarations_pruned.is_empty()
            || !self.key_sections_pruned.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if self.wrapped > 0 {
            parts.push(format!("{} toggles added", self.wrapped));
        }
        if self.unwrapped > 0 {
            parts.push(format!("{} toggles removed", self.unwrapped));
        }
        if self.transparency > 0 {
            parts.push(format!("{} transparency overrides", self.transparency));
        }
        let pruned = self.declarations_pruned.len() + self.key_sections_pruned.len();
        if pruned > 0 {
            parts.push(format!("{} unused declarations pruned", pruned));
        }
        match (self.skipped(), self.rejected()) {
            (0, _) => {}
            (skipped, 0) => parts.push(format!("{} skipped", skipped)),
            (skipped, rejected) => parts.push(format!("{} skipped ({} complex)", skipped, rejected)),
        }

        if parts.is_empty() {
            "Nothing to apply".to_string()
        } else {
            parts.join(", ")
        }
    }
}
