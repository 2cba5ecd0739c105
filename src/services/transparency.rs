//! Blend override rewriter.
//!
//! Routes a parameterized `drawindexed = A, B, C` through a new
//! `[CustomShaderTransparency<N>]` section: the original directive is
//! commented out and replaced by `run = <Name>`, and the shader section
//! (blend lines plus a copy of the directive) is appended to the end of the
//! owning component section.

use super::lexer::{self, LineKind};
use super::line_store::{LineStore, indent_of};
use super::scanner::{self, SectionKind};
use crate::models::{BlendMode, Diagnostic, TransparencySpec};

#[derive(Debug, Clone, Default)]
pub struct TransparencyOutcome {
    pub applied: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Apply every spec whose directive is still present.
pub fn apply_transparency(store: &mut LineStore, specs: &[TransparencySpec]) -> TransparencyOutcome {
    let mut outcome = TransparencyOutcome::default();
    let mut matched = vec![false; specs.len()];

    let sections = scanner::scan_sections(store);
    for section in sections.iter().rev() {
        let SectionKind::Component(component) = section.kind else {
            continue;
        };

        // (line index, spec position), ascending by line.
        let mut hits: Vec<(usize, usize)> = Vec::new();
        for (pos, spec) in specs.iter().enumerate() {
            if matched[pos] || spec.component != component {
                continue;
            }
            let found = section.body().find(|&i| {
                store.get(i).is_some_and(|l| {
                    lexer::classify(l) == LineKind::Directive
                        && lexer::parse_draw_params(l) == Some(spec.params)
                        && !hits.iter().any(|&(h, _)| h == i)
                })
            });
            if let Some(i) = found {
                hits.push((i, pos));
                matched[pos] = true;
            }
        }
        if hits.is_empty() {
            continue;
        }
        hits.sort_unstable();

        let mut shader_lines = Vec::new();
        for &(_, pos) in &hits {
            shader_lines.extend(shader_section(store, &specs[pos]));
        }
        let at = section.content_end(store);
        store.insert_lines(at, shader_lines);

        for &(i, pos) in hits.iter().rev() {
            let original = store.get(i).unwrap_or_default().to_string();
            let indent = indent_of(&original).to_string();
            let replacement = vec![
                store.line(format!("{indent}; {}", original.trim())),
                store.line(format!("{indent}run = {}", specs[pos].shader_name)),
            ];
            store.splice(i..i + 1, replacement);
            tracing::debug!(
                "Routed line {} of component {} through [{}]",
                i + 1,
                component,
                specs[pos].shader_name
            );
        }
        outcome.applied += hits.len();
    }

    for (spec, _) in specs.iter().zip(&matched).filter(|(_, m)| !**m) {
        let directive = format!("drawindexed = {}", spec.params);
        tracing::warn!(
            "Transparency target not found in component {}, skipping: {}",
            spec.component,
            directive
        );
        outcome.diagnostics.push(Diagnostic::TargetNotFound { directive });
    }

    outcome
}

fn shader_section(store: &LineStore, spec: &TransparencySpec) -> Vec<String> {
    let mut out = vec![store.line(""), store.line(format!("[{}]", spec.shader_name))];
    let comment = spec.comment.trim();
    if !comment.is_empty() {
        out.push(store.line(format!("; {comment}")));
    }
    match &spec.mode {
        BlendMode::TextureAlpha => out.push(store.line("blend = ADD SRC_ALPHA INV_SRC_ALPHA")),
        BlendMode::BlendFactor(factors) => {
            out.push(store.line("blend = ADD BLEND_FACTOR INV_BLEND_FACTOR"));
            for (i, factor) in factors.iter().enumerate() {
                out.push(store.line(format!("blend_factor[{i}] = {factor}")));
            }
        }
    }
    out.push(store.line(format!("drawindexed = {}", spec.params)));
    out
}
