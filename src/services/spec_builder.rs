//! Turns an operator selection into pending edits.

use super::lexer;
use crate::models::{
    BlendMode, DrawEntry, TargetRef, ToggleSpec, ToggleStatus, TransparencySpec, UnwrapSpec,
};
use thiserror::Error;

/// Why a selection could not become a pending edit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("Variable name `{0}` is not a valid identifier")]
    InvalidVariable(String),

    #[error("Key binding must not be empty")]
    EmptyKey,

    #[error("Line {0} is inside a complex toggle block and cannot be edited automatically")]
    UnsafeEdit(usize),

    #[error("Line {0} is not inside a simple toggle block")]
    NotToggled(usize),

    #[error("Line {0} is not of the form `drawindexed = A, B, C`")]
    NotParameterized(usize),

    #[error("Blend factor `{0}` must be a number between 0.0 and 1.0")]
    InvalidBlendFactor(String),
}

/// Build a toggle request for `entry`.
///
/// A simple existing toggle is recorded in `replaces` so the apply pass
/// unwraps it before wrapping again; complex blocks are refused.
pub fn build_spec(entry: &DrawEntry, variable: &str, key: &str) -> Result<ToggleSpec, SpecError> {
    let variable = variable.trim();
    let variable = variable.strip_prefix('$').unwrap_or(variable);
    if !lexer::is_identifier(variable) {
        return Err(SpecError::InvalidVariable(variable.to_string()));
    }
    let key = key.trim();
    if key.is_empty() {
        return Err(SpecError::EmptyKey);
    }

    let replaces = match entry.status {
        ToggleStatus::ExistingComplex => return Err(SpecError::UnsafeEdit(entry.line + 1)),
        ToggleStatus::ExistingSimple => entry.block.clone(),
        ToggleStatus::None => None,
    };

    Ok(ToggleSpec {
        variable: variable.to_string(),
        key: key.to_string(),
        target: TargetRef::from_entry(entry),
        comment: entry.comment.clone(),
        replaces,
    })
}

/// Build an unwrap request for an existing simple toggle.
pub fn build_unwrap(entry: &DrawEntry) -> Result<UnwrapSpec, SpecError> {
    match (&entry.status, &entry.block) {
        (ToggleStatus::ExistingComplex, _) => Err(SpecError::UnsafeEdit(entry.line + 1)),
        (ToggleStatus::ExistingSimple, Some(block)) => Ok(UnwrapSpec {
            block: block.clone(),
            directive: entry.directive.clone(),
        }),
        _ => Err(SpecError::NotToggled(entry.line + 1)),
    }
}

/// Build a blend override for `entry`, naming its section
/// `CustomShaderTransparency<shader_index>`.
pub fn build_transparency(
    entry: &DrawEntry,
    mode: BlendMode,
    shader_index: u32,
) -> Result<TransparencySpec, SpecError> {
    let params = lexer::parse_draw_params(&entry.directive)
        .ok_or(SpecError::NotParameterized(entry.line + 1))?;

    let mode = match mode {
        BlendMode::BlendFactor(factors) => BlendMode::BlendFactor(validate_factors(factors)?),
        BlendMode::TextureAlpha => BlendMode::TextureAlpha,
    };

    Ok(TransparencySpec {
        component: entry.component,
        params,
        comment: entry.comment_text().to_string(),
        mode,
        shader_name: format!("CustomShaderTransparency{}", shader_index),
    })
}

fn validate_factors(factors: [String; 4]) -> Result<[String; 4], SpecError> {
    let factors = factors.map(|f| f.trim().to_string());
    for factor in &factors {
        match factor.parse::<f64>() {
            Ok(v) if (0.0..=1.0).contains(&v) => {}
            _ => return Err(SpecError::InvalidBlendFactor(factor.clone())),
        }
    }
    Ok(factors)
}
