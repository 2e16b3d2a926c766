//! Question selection.
//!
//! The interactive surface offers preset question buttons and a free-text
//! field. Both resolve to a single "current question" through an explicit
//! priority-ordered resolver: non-blank free text wins over a preset, and
//! every preset is independently selectable.

use anyhow::{bail, Result};

/// User question input, before resolution against the preset list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionInput {
    /// Free-form text typed by the user.
    FreeText(String),
    /// Index into the configured preset list.
    Preset(usize),
    /// Nothing selected or typed.
    None,
}

impl QuestionInput {
    /// Combine the free-text field and an optional preset selection.
    /// Free text takes precedence when it is non-blank.
    pub fn from_parts(free_text: Option<&str>, preset: Option<usize>) -> Self {
        match free_text {
            Some(text) if !text.trim().is_empty() => {
                QuestionInput::FreeText(text.trim().to_string())
            }
            _ => match preset {
                Some(i) => QuestionInput::Preset(i),
                None => QuestionInput::None,
            },
        }
    }

    /// Resolve to the question string that will drive retrieval, or `None`
    /// when nothing was asked. A preset index outside the configured list
    /// is an error.
    pub fn resolve(&self, presets: &[String]) -> Result<Option<String>> {
        match self {
            QuestionInput::FreeText(text) => Ok(Some(text.clone())),
            QuestionInput::Preset(i) => match presets.get(*i) {
                Some(q) => Ok(Some(q.clone())),
                None => bail!(
                    "preset index {} out of range (0..{})",
                    i,
                    presets.len()
                ),
            },
            QuestionInput::None => Ok(None),
        }
    }
}
