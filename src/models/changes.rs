use super::entry::{DrawEntry, DrawParams, ToggleBlock};
use super::report::Diagnostic;

/// Where a pending edit expects its directive to be.
///
/// `index` is the position at scan time. Edits applied earlier in the same
/// pass renumber lines, so the mutators re-resolve by `text` and only use
/// `index` to choose between identical candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    pub index: usize,
    pub text: String,
}

impl TargetRef {
    pub fn from_entry(entry: &DrawEntry) -> Self {
        Self {
            index: entry.line,
            text: entry.directive.clone(),
        }
    }
}

/// A request to guard one directive behind a cycle-key variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleSpec {
    pub variable: String,
    pub key: String,
    pub target: TargetRef,
    pub comment: Option<String>,
    /// Existing simple block that has to be unwrapped before the new guard
    /// is applied.
    pub replaces: Option<ToggleBlock>,
}

/// Blend formula written into a `CustomShaderTransparency<N>` section.
#[derive(Debug, Clone, PartialEq)]
pub enum BlendMode {
    /// `blend = ADD SRC_ALPHA INV_SRC_ALPHA`
    TextureAlpha,
    /// `blend = ADD BLEND_FACTOR INV_BLEND_FACTOR` plus `blend_factor[0..3]`.
    /// Factors are kept as the operator typed them.
    BlendFactor([String; 4]),
}

/// A request to route one parameterized directive through a custom blend
/// section.
#[derive(Debug, Clone, PartialEq)]
pub struct TransparencySpec {
    pub component: u32,
    pub params: DrawParams,
    pub comment: String,
    pub mode: BlendMode,
    pub shader_name: String,
}

/// An explicit unwrap of an existing simple toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwrapSpec {
    pub block: ToggleBlock,
    pub directive: String,
}

/// Everything queued between a scan and an apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingChanges {
    pub toggles: Vec<ToggleSpec>,
    pub unwraps: Vec<UnwrapSpec>,
    pub transparency: Vec<TransparencySpec>,
    /// Selections refused while queueing, carried into the next report.
    pub rejected: Vec<Diagnostic>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.toggles.is_empty() && self.unwraps.is_empty() && self.transparency.is_empty()
    }

    pub fn len(&self) -> usize {
        self.toggles.len() + self.unwraps.len() + self.transparency.len()
    }

    pub fn clear(&mut self) {
        self.toggles.clear();
        self.unwraps.clear();
        self.transparency.clear();
        self.rejected.clear();
    }

    /// Queue a toggle. A toggle already queued for the same directive is
    /// replaced.
    pub fn push_toggle(&mut self, spec: ToggleSpec) {
        match self
            .toggles
            .iter_mut()
            .find(|t| t.target.index == spec.target.index)
        {
            Some(existing) => *existing = spec,
            None => self.toggles.push(spec),
        }
    }

    /// Queue an unwrap; a block already queued is ignored.
    pub fn push_unwrap(&mut self, spec: UnwrapSpec) {
        if !self.unwraps.iter().any(|u| u.block.start == spec.block.start) {
            self.unwraps.push(spec);
        }
    }

    /// Queue a transparency edit. A spec for the same directive replaces the
    /// earlier one but keeps its shader name. Returns the shader name in use.
    pub fn push_transparency(&mut self, mut spec: TransparencySpec) -> String {
        if let Some(existing) = self
            .transparency
            .iter_mut()
            .find(|t| t.component == spec.component && t.params == spec.params)
        {
            spec.shader_name = existing.shader_name.clone();
            *existing = spec;
            return existing.shader_name.clone();
        }
        let name = spec.shader_name.clone();
        self.transparency.push(spec);
        name
    }

    /// Record a selection that was refused instead of queued.
    pub fn reject(&mut self, diagnostic: Diagnostic) {
        if !self.rejected.contains(&diagnostic) {
            self.rejected.push(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transparency(name: &str, mode: BlendMode) -> TransparencySpec {
        TransparencySpec {
            component: 1,
            params: DrawParams(0, 10, 0),
            comment: String::new(),
            mode,
            shader_name: name.to_string(),
        }
    }

    #[test]
    fn test_requeued_transparency_keeps_shader_name() {
        let mut pending = PendingChanges::new();
        pending.push_transparency(transparency("CustomShaderTransparency1", BlendMode::TextureAlpha));
        let name = pending.push_transparency(transparency(
            "CustomShaderTransparency2",
            BlendMode::BlendFactor(["0.5".into(), "0.5".into(), "0.5".into(), "1".into()]),
        ));

        assert_eq!(name, "CustomShaderTransparency1");
        assert_eq!(pending.transparency.len(), 1);
        assert!(matches!(pending.transparency[0].mode, BlendMode::BlendFactor(_)));
    }

    #[test]
    fn test_requeued_toggle_replaces_earlier() {
        let toggle = |var: &str| ToggleSpec {
            variable: var.to_string(),
            key: "h".to_string(),
            target: TargetRef {
                index: 7,
                text: "drawindexed = 1, 2, 3\n".to_string(),
            },
            comment: None,
            replaces: None,
        };
        let mut pending = PendingChanges::new();
        pending.push_toggle(toggle("first"));
        pending.push_toggle(toggle("second"));

        assert_eq!(pending.toggles.len(), 1);
        assert_eq!(pending.toggles[0].variable, "second");
        assert_eq!(pending.toggles[0].target.index, 7);
    }

    #[test]
    fn test_duplicate_unwrap_ignored() {
        let block = ToggleBlock {
            variable: "x".to_string(),
            start: 2,
            end: 4,
            status: crate::models::ToggleStatus::ExistingSimple,
        };
        let mut pending = PendingChanges::new();
        for _ in 0..2 {
            pending.push_unwrap(UnwrapSpec {
                block: block.clone(),
                directive: "drawindexed = 1, 2, 3\n".to_string(),
            });
        }
        assert_eq!(pending.len(), 1);
        pending.clear();
        assert!(pending.is_empty());
    }
}
