//! Request, response and policy types for grounded answering.

use crate::gemini::{GenerateContentResponse, HarmBlockThreshold, HarmCategory, SafetySetting};

/// A question paired with the retrieved text it must be answered from.
///
/// Empty strings are allowed; the template still renders and the model decides
/// whether an answer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    question: String,
    context: String,
}

impl GenerationRequest {
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: context.into(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn context(&self) -> &str {
        &self.context
    }
}

/// Harm-category thresholds sent with every request.
///
/// The only way to obtain one is [`SafetyPolicy::food_safety`]; there are no
/// mutators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyPolicy {
    settings: Vec<SafetySetting>,
}

impl SafetyPolicy {
    /// Dangerous content is blocked only at high severity. Food-safety answers
    /// routinely mention knives, heat and pathogens, which the default threshold
    /// flags.
    pub fn food_safety() -> Self {
        Self {
            settings: vec![SafetySetting {
                category: HarmCategory::DangerousContent,
                threshold: HarmBlockThreshold::BlockOnlyHigh,
            }],
        }
    }

    /// Threshold configured for `category`, if any.
    pub fn threshold(&self, category: HarmCategory) -> Option<HarmBlockThreshold> {
        self.settings
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.threshold)
    }

    pub fn settings(&self) -> &[SafetySetting] {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self::food_safety()
    }
}

/// The model's answer plus what the service reported about how it finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResponse {
    /// Verbatim model text; empty when nothing was returned
    text: String,
    /// Finish reason of the first candidate (e.g. "STOP", "SAFETY")
    finish_reason: Option<String>,
    /// Set when the prompt itself was blocked
    block_reason: Option<String>,
}

impl GenerationResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: None,
            block_reason: None,
        }
    }

    /// Returns the answer text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the response, returning the answer text.
    pub fn into_text(self) -> String {
        self.text
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.block_reason.as_deref()
    }

    /// Returns true if the service withheld the answer for safety reasons.
    pub fn is_blocked(&self) -> bool {
        self.block_reason.is_some() || self.finish_reason.as_deref() == Some("SAFETY")
    }

    /// Returns true if the caller should show "no answer available".
    pub fn is_unanswerable(&self) -> bool {
        self.text.trim().is_empty() || indicates_unavailable(&self.text)
    }
}

impl From<GenerateContentResponse> for GenerationResponse {
    fn from(response: GenerateContentResponse) -> Self {
        Self {
            text: response.text().unwrap_or_default(),
            finish_reason: response.finish_reason().map(str::to_string),
            block_reason: response.block_reason().map(str::to_string),
        }
    }
}

/// Phrases a model uses when it declines for lack of context.
const UNAVAILABLE_MARKERS: &[&str] = &[
    "don't have that information",
    "do not have that information",
    "don't have information",
    "do not have information",
    "not available in",
    "not in the context",
    "not contained in",
    "no information",
    "not mentioned in",
    "cannot answer",
    "can't answer",
];

/// Heuristic check for an "information not available" reply.
///
/// The fallback wording is only a prompt instruction, so the model may
/// paraphrase it; this matches the common variants case-insensitively.
pub fn indicates_unavailable(text: &str) -> bool {
    let lower = text.to_lowercase().replace('\u{2019}', "'");
    UNAVAILABLE_MARKERS.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answerer::FALLBACK_ANSWER;

    #[test]
    fn food_safety_policy_has_single_dangerous_content_entry() {
        let policy = SafetyPolicy::food_safety();

        assert_eq!(policy.len(), 1);
        assert_eq!(
            policy.threshold(HarmCategory::DangerousContent),
            Some(HarmBlockThreshold::BlockOnlyHigh)
        );
        assert_eq!(policy.threshold(HarmCategory::Harassment), None);
    }

    #[test]
    fn default_policy_is_food_safety() {
        assert_eq!(SafetyPolicy::default(), SafetyPolicy::food_safety());
    }

    #[test]
    fn request_accessors() {
        let request = GenerationRequest::new("q", "");
        assert_eq!(request.question(), "q");
        assert_eq!(request.context(), "");
    }

    #[test]
    fn response_from_blocked_service_reply_is_empty() {
        let raw: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();

        let response = GenerationResponse::from(raw);
        assert_eq!(response.text(), "");
        assert!(response.is_blocked());
        assert!(response.is_unanswerable());
    }

    #[test]
    fn response_from_text_keeps_text_verbatim() {
        let raw = GenerateContentResponse::from_text("  Keep it under 2 hours.\n");

        let response = GenerationResponse::from(raw);
        assert_eq!(response.text(), "  Keep it under 2 hours.\n");
        assert_eq!(response.finish_reason(), Some("STOP"));
        assert!(!response.is_blocked());
        assert!(!response.is_unanswerable());
    }

    #[test]
    fn fallback_sentence_is_detected() {
        assert!(indicates_unavailable(FALLBACK_ANSWER));
        assert!(indicates_unavailable(
            "I\u{2019}m sorry, I DON\u{2019}T HAVE THAT INFORMATION in the manual."
        ));
        assert!(indicates_unavailable(
            "That is not mentioned in the provided context."
        ));
    }

    #[test]
    fn grounded_answer_is_not_flagged() {
        assert!(!indicates_unavailable(
            "Raw chicken should not sit at room temperature for more than 2 hours."
        ));
    }
}
