//! Narration layer over the pricing engine.
//!
//! This crate owns the boundary to the external text-generation service:
//! - `llm` - the pluggable [`TextGenerator`](llm::TextGenerator) trait and
//!   its HTTP-backed implementation
//! - `writers` - suggestion and proposal writers that hand the engine's
//!   fact sheet to the generator and fall back to deterministic templates
//!   when it is unavailable
//!
//! # Safety Principle
//!
//! The LLM is strictly a narrator. It never decides prices, feature sets, or
//! ranges; those come from the deterministic engine in `estimo-core`, and
//! every failure of the narrator degrades to the templated fallback instead
//! of surfacing to the caller.

pub mod llm;
pub mod writers;

pub use llm::{OllamaTextGenerator, TextGenerator, UnavailableTextGenerator};
pub use writers::{ProposalWriter, SuggestionWriter};
