//! Session state and pipeline orchestration.
//!
//! A [`Session`] owns the interactive surface's mutable state — the API
//! credential and the knowledge built from the current document — as
//! explicit session-scoped data rather than process-wide globals. Both
//! gating conditions (credential present, document present) must hold
//! before any processing occurs.
//!
//! Upload flow: extract → chunk → embed → index, run once per document.
//! Re-loading unchanged bytes is a no-op (recognized by content hash).
//! Question flow: retrieve top-k fragments, stuff them into a prompt, run
//! one deterministic generation request.

use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::chunk::chunk_text;
use crate::config::Config;
use crate::embedding::Embedder;
use crate::extract::extract_text;
use crate::generate::Generator;
use crate::index::KnowledgeIndex;
use crate::models::AnswerOutcome;

/// Gating failure: processing was requested before both preconditions held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// No API credential supplied; blocks all fragment/vector computation.
    MissingCredential,
    /// No document loaded; questions cannot be answered.
    MissingDocument,
}

impl std::fmt::Display for GateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateError::MissingCredential => {
                write!(f, "no API key supplied; provide a key to continue")
            }
            GateError::MissingDocument => {
                write!(f, "no document loaded; upload a PDF to ask questions")
            }
        }
    }
}

impl std::error::Error for GateError {}

/// Everything derived from the current document. Replaced wholesale on each
/// upload, so answers never mix fragments from two documents.
pub struct Knowledge {
    /// SHA-256 of the uploaded bytes, used to skip redundant re-processing.
    pub doc_hash: String,
    /// Length of the extracted text, in characters.
    pub char_count: usize,
    pub index: KnowledgeIndex,
}

/// Summary of one upload-processing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub char_count: usize,
    pub fragment_count: usize,
    /// True when the bytes matched the current document and no work ran.
    pub reused: bool,
}

/// Session-scoped state for one user.
#[derive(Default)]
pub struct Session {
    api_key: Option<String>,
    knowledge: Option<Knowledge>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the credential for this session. It lives only in memory and
    /// is never written to disk.
    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.api_key = Some(key.into());
    }

    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(k) if !k.trim().is_empty() => Ok(k),
            _ => Err(GateError::MissingCredential.into()),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    pub fn knowledge(&self) -> Option<&Knowledge> {
        self.knowledge.as_ref()
    }

    /// Run the upload pipeline for a PDF.
    ///
    /// Gated on the credential. If the bytes hash to the current document's
    /// hash, nothing is re-extracted or re-embedded. Otherwise any prior
    /// knowledge is dropped first, so a failed upload cannot leave answers
    /// flowing from a stale document.
    pub async fn load_document(
        &mut self,
        bytes: &[u8],
        config: &Config,
        embedder: &dyn Embedder,
    ) -> Result<LoadSummary> {
        self.api_key()?;

        let doc_hash = hex::encode(Sha256::digest(bytes));
        if let Some(knowledge) = &self.knowledge {
            if knowledge.doc_hash == doc_hash {
                return Ok(LoadSummary {
                    char_count: knowledge.char_count,
                    fragment_count: knowledge.index.len(),
                    reused: true,
                });
            }
        }
        self.knowledge = None;

        let text = extract_text(bytes).map_err(anyhow::Error::new)?;
        let char_count = text.chars().count();
        let fragments = chunk_text(&text, &config.chunking);
        let index = KnowledgeIndex::build(fragments, embedder).await?;
        let fragment_count = index.len();

        self.knowledge = Some(Knowledge {
            doc_hash,
            char_count,
            index,
        });

        Ok(LoadSummary {
            char_count,
            fragment_count,
            reused: false,
        })
    }

    /// Answer a question against the current document.
    ///
    /// Gated on both preconditions. A provider failure aborts only this
    /// question/answer cycle; the knowledge index stays usable.
    pub async fn ask(
        &self,
        question: &str,
        config: &Config,
        embedder: &dyn Embedder,
        generator: &dyn Generator,
    ) -> Result<AnswerOutcome> {
        self.api_key()?;
        let knowledge = self
            .knowledge
            .as_ref()
            .ok_or(GateError::MissingDocument)?;

        let fragments = knowledge
            .index
            .query(question, config.retrieval.top_k, embedder)
            .await?;

        let prompt = build_prompt(&fragments, question);
        let answer = generator.generate(&prompt).await?;

        Ok(AnswerOutcome {
            answer,
            fragments_used: fragments,
        })
    }
}

/// Build the stuffed prompt: retrieved fragments as context, then the
/// question. Generation is instructed to stay within the given context.
pub fn build_prompt(fragments: &[crate::models::Fragment], question: &str) -> String {
    let context = fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, just say that you don't know; do not try \
         to make up an answer.\n\n{}\n\nQuestion: {}\nHelpful Answer:",
        context, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fragment;

    #[test]
    fn prompt_contains_context_and_question() {
        let fragments = vec![
            Fragment {
                index: 0,
                text: "First piece.".to_string(),
                hash: "a".to_string(),
            },
            Fragment {
                index: 1,
                text: "Second piece.".to_string(),
                hash: "b".to_string(),
            },
        ];
        let prompt = build_prompt(&fragments, "What happened?");
        assert!(prompt.contains("First piece.\n\nSecond piece."));
        assert!(prompt.contains("Question: What happened?"));
    }

    #[test]
    fn blank_key_does_not_satisfy_the_gate() {
        let mut session = Session::new();
        session.set_api_key("   ");
        assert!(!session.has_credential());
        assert!(session.api_key().is_err());
    }

    #[test]
    fn gate_errors_are_distinguishable() {
        let session = Session::new();
        let err = session.api_key().unwrap_err();
        assert_eq!(
            err.downcast_ref::<GateError>(),
            Some(&GateError::MissingCredential)
        );
    }
}
