//! Pre-built message fixtures for testing.

use conduit_core::Message;

/// Creates a simple user message.
pub fn user_message(text: &str) -> Message {
    Message::user(text)
}

/// Creates a simple assistant message.
pub fn assistant_message(text: &str) -> Message {
    Message::assistant(text)
}

/// Creates a system message.
pub fn system_message(text: &str) -> Message {
    Message::system(text)
}

/// Creates a conversation with a simple exchange.
pub fn simple_conversation() -> Vec<Message> {
    vec![
        system_message("You are a helpful assistant."),
        user_message("Hello!"),
        assistant_message("Hi there! How can I help you today?"),
    ]
}

/// Creates a multi-turn conversation without a leading system message.
pub fn multi_turn_conversation() -> Vec<Message> {
    vec![
        user_message("What is the capital of France?"),
        assistant_message("Paris."),
        user_message("And of Italy?"),
        assistant_message("Rome."),
        user_message("Thanks!"),
    ]
}
