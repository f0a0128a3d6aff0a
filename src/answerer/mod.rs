//! Grounded question answering using Gemini.
//!
//! This module provides the `AnswerGenerator` struct which renders a question and
//! its retrieved context into a fixed food-safety prompt and asks the model to
//! answer from that context only.

mod answer_generator;
mod prompt;
mod types;

pub use answer_generator::{AnswerGenerator, AnswerGeneratorBuilder};
pub use prompt::{FALLBACK_ANSWER, render_prompt};
pub use types::{GenerationRequest, GenerationResponse, SafetyPolicy, indicates_unavailable};
