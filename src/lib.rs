pub mod answerer;
pub mod config;
pub mod gemini;

pub use answerer::{
    AnswerGenerator, AnswerGeneratorBuilder, GenerationRequest, GenerationResponse, SafetyPolicy,
    indicates_unavailable, render_prompt,
};
pub use config::Settings;
pub use gemini::{GeminiClient, GeminiClientBuilder, GeminiClientTrait, GeminiError};
