//! Completion request types for LLM providers.

use conduit_core::{Message, ProviderError};

/// Token cap used by [`CompletionRequest::new`].
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Sampling temperature used by [`CompletionRequest::new`].
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Highest temperature accepted by [`CompletionRequest::validate`].
pub const MAX_TEMPERATURE: f32 = 2.0;

/// A request to complete a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instructions that logically precede every message.
    pub system_prompt: Option<String>,
    /// Conversation messages, in conversational order.
    pub messages: Vec<Message>,
    /// Upper bound on generated tokens. Must be positive.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 - 2.0).
    pub temperature: f32,
}

impl Default for CompletionRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionRequest {
    pub fn new() -> Self {
        Self {
            system_prompt: None,
            messages: Vec::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Appends a message to the conversation.
    #[must_use]
    pub fn message(mut self, msg: Message) -> Self {
        self.messages.push(msg);
        self
    }

    #[must_use]
    pub fn messages(mut self, msgs: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(msgs);
        self
    }

    #[must_use]
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    #[must_use]
    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    /// The system prompt, if set and non-empty.
    pub fn effective_system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref().filter(|p| !p.is_empty())
    }

    /// Checks the request before anything is sent to a provider.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.max_tokens == 0 {
            return Err(ProviderError::InvalidInput(
                "max_tokens must be greater than zero".into(),
            ));
        }
        if self.messages.is_empty() && self.effective_system_prompt().is_none() {
            return Err(ProviderError::InvalidInput(
                "request needs at least one message or a system prompt".into(),
            ));
        }
        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(ProviderError::InvalidInput(format!(
                "temperature {} outside 0.0..={MAX_TEMPERATURE}",
                self.temperature
            )));
        }
        Ok(())
    }

    /// Flattens the system prompt and messages into the sequence a provider receives.
    ///
    /// Message order is preserved. When the conversation already opens with a
    /// system message, the system prompt is merged into it instead of adding a
    /// second one; identical texts collapse to a single copy.
    pub fn conversation(&self) -> Vec<Message> {
        let mut out = Vec::with_capacity(self.messages.len() + 1);
        let mut rest = self.messages.iter();

        if let Some(prompt) = self.effective_system_prompt() {
            match self.messages.first() {
                Some(first) if first.is_system() => {
                    rest.next();
                    let merged = if first.content.is_empty() || first.content == prompt {
                        prompt.to_owned()
                    } else {
                        format!("{prompt}\n\n{}", first.content)
                    };
                    out.push(Message::system(merged));
                }
                _ => out.push(Message::system(prompt)),
            }
        }

        out.extend(rest.cloned());
        out
    }
}
