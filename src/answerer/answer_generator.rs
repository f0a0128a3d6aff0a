//! Grounded answer generation.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::gemini::{
    Content, GeminiClientTrait, GeminiError, GenerateContentRequest, GenerationConfig,
};

use super::prompt::render_prompt;
use super::types::{GenerationRequest, GenerationResponse, SafetyPolicy};

/// Builder for constructing `AnswerGenerator` instances.
#[derive(Default)]
pub struct AnswerGeneratorBuilder {
    client: Option<Arc<dyn GeminiClientTrait>>,
}

impl AnswerGeneratorBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Gemini client to use.
    pub fn client(mut self, client: Arc<dyn GeminiClientTrait>) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the `AnswerGenerator`.
    ///
    /// # Panics
    ///
    /// Panics if `client()` was not called.
    #[must_use]
    pub fn build(self) -> AnswerGenerator {
        AnswerGenerator::new(self.client.expect("client must be set via client() method"))
    }
}

/// Answers questions from supplied context only.
///
/// Sampling is fixed at temperature 0 and the safety policy at
/// [`SafetyPolicy::food_safety`]; neither can be changed after construction or
/// per call. The generator holds no mutable state, so a single instance can be
/// shared across threads.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use freshbot::answerer::AnswerGeneratorBuilder;
/// use freshbot::gemini::GeminiClientBuilder;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiClientBuilder::new().model("gemini-1.5-flash").build()?;
/// let generator = AnswerGeneratorBuilder::new().client(Arc::new(client)).build();
///
/// let answer = generator.ask(
///     "How long can raw chicken sit at room temperature?",
///     "Raw poultry must not exceed 2 hours at room temperature.",
/// )?;
/// println!("{answer}");
/// # Ok(())
/// # }
/// ```
pub struct AnswerGenerator {
    client: Arc<dyn GeminiClientTrait>,
    generation_config: GenerationConfig,
    safety_policy: SafetyPolicy,
}

impl AnswerGenerator {
    /// Creates a new `AnswerGenerator` with the specified client.
    #[must_use]
    pub fn new(client: Arc<dyn GeminiClientTrait>) -> Self {
        Self {
            client,
            generation_config: GenerationConfig::DETERMINISTIC,
            safety_policy: SafetyPolicy::food_safety(),
        }
    }

    /// Returns the sampling parameters sent with every request.
    pub fn generation_config(&self) -> GenerationConfig {
        self.generation_config
    }

    /// Returns the safety policy sent with every request.
    pub fn safety_policy(&self) -> &SafetyPolicy {
        &self.safety_policy
    }

    /// Builds the exact request `ask` sends for this question and context.
    pub fn build_request(&self, question: &str, context: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(render_prompt(question, context))],
            safety_settings: self.safety_policy.settings().to_vec(),
            generation_config: Some(self.generation_config),
        }
    }

    /// Answers `question` using only `context`.
    ///
    /// Returns the model's text verbatim. An empty string means the service
    /// returned no text (typically a safety block) and should be shown to the
    /// user as "no answer available".
    ///
    /// # Errors
    ///
    /// Any transport, HTTP or response-parsing failure from the client is
    /// returned unchanged. Nothing is retried.
    pub fn ask(&self, question: &str, context: &str) -> Result<String, GeminiError> {
        self.generate(question, context).map(GenerationResponse::into_text)
    }

    /// Like [`ask`](Self::ask) but keeps the service's finish and block reasons.
    #[instrument(skip_all, fields(question_len = question.len(), context_len = context.len()))]
    pub fn generate(
        &self,
        question: &str,
        context: &str,
    ) -> Result<GenerationResponse, GeminiError> {
        let request = self.build_request(question, context);

        let response = GenerationResponse::from(self.client.generate_content(&request)?);

        if response.text().is_empty() {
            warn!(
                finish_reason = ?response.finish_reason(),
                block_reason = ?response.block_reason(),
                "Model returned no text"
            );
        } else {
            debug!(answer_len = response.text().len(), "Model answered");
        }

        Ok(response)
    }

    /// Answers a [`GenerationRequest`].
    pub fn answer(&self, request: &GenerationRequest) -> Result<String, GeminiError> {
        self.ask(request.question(), request.context())
    }
}
