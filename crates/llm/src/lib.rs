//! Answer Service collaborator boundary: the generative backend that turns
//! an assembled context string into an answer, plus token estimation used
//! during context packing.

pub mod gemini;
pub mod service;

pub use gemini::GeminiAnswerService;
pub use service::{AnswerError, AnswerService, CharHeuristic, TokenEstimator};
