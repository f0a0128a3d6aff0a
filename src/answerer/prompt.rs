//! Prompt template for grounded answers.

/// Sentence the model is told to reply with when the context lacks the answer.
pub const FALLBACK_ANSWER: &str =
    "I'm sorry, I don't have that information in the food safety manual.";

/// Prompt template. `{context}` and `{question}` are substituted verbatim.
const PROMPT_TEMPLATE: &str = r#"You are FreshBot, a food safety expert. Answer the question using ONLY the context provided.
If the answer is not in the context, say "{fallback}"

Context:
{context}

Question:
{question}
"#;

/// Renders the prompt for `question` grounded in `context`.
///
/// Plain substitution: neither input is escaped, so template-like sequences in
/// them (e.g. a literal `{question}` inside the context) are passed through as
/// text. The context is substituted last so its content is never re-scanned.
pub fn render_prompt(question: &str, context: &str) -> String {
    let (head, tail) = PROMPT_TEMPLATE
        .split_once("{context}")
        .unwrap_or((PROMPT_TEMPLATE, ""));

    let head = head.replace("{fallback}", FALLBACK_ANSWER);
    let tail = tail.replace("{question}", question);

    format!("{head}{context}{tail}")
}
