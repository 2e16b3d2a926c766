//! Core data types that flow through the question-answering pipeline.

/// A bounded-length slice of extracted document text, the unit of retrieval.
///
/// Fragments are produced in document order with contiguous indices starting
/// at 0. Each carries a SHA-256 hash of its text so identical rebuilds are
/// recognizable.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub index: usize,
    pub text: String,
    pub hash: String,
}

/// The result of one question/answer cycle.
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    /// Text returned verbatim from the generative provider.
    pub answer: String,
    /// The fragments that were retrieved and stuffed into the prompt,
    /// in retrieval rank order.
    pub fragments_used: Vec<Fragment>,
}
