/// Gemini HTTP client module.
///
/// This module provides a blocking HTTP client for the Gemini `generateContent`
/// endpoint, the typed request/response wire format, and the error type shared
/// by everything that talks to the service.
mod client;
mod types;

pub use client::{GeminiClient, GeminiClientBuilder, GeminiClientTrait, GeminiError};
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    HarmBlockThreshold, HarmCategory, Part, PromptFeedback, SafetySetting,
};
