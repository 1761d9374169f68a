//! Completion request fixtures.

use conduit_llm_client::CompletionRequest;

use super::messages::{multi_turn_conversation, simple_conversation, user_message};

/// A single user question with default limits.
pub fn simple_request(text: &str) -> CompletionRequest {
    CompletionRequest::new().message(user_message(text))
}

/// A request with a system prompt and a multi-turn history.
pub fn prompted_request() -> CompletionRequest {
    CompletionRequest::new()
        .system_prompt("Answer in one word.")
        .messages(multi_turn_conversation())
        .max_tokens(16)
        .temperature(0.0)
}

/// A request whose history already starts with a system message.
pub fn request_with_system_history(prompt: &str) -> CompletionRequest {
    CompletionRequest::new()
        .system_prompt(prompt)
        .messages(simple_conversation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_valid() {
        assert!(simple_request("hi").validate().is_ok());
        assert!(prompted_request().validate().is_ok());
        assert!(request_with_system_history("Be brief.").validate().is_ok());
    }
}
