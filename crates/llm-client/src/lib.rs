//! Conduit LLM Client - provider-agnostic completion adapters.

pub mod adapter;
pub mod mock;
pub mod openai;
pub mod request;
pub mod response;
pub mod stream;

pub use adapter::CompletionAdapter;
pub use mock::MockAdapter;
pub use openai::OpenAiAdapter;
pub use request::CompletionRequest;
pub use response::CompletionResponse;
pub use stream::{CompletionStream, FragmentStream};

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::{Context, Message};
    use std::sync::Arc;

    // === Trait Object Tests ===

    #[tokio::test]
    async fn adapters_are_interchangeable_behind_dyn() {
        let adapters: Vec<Arc<dyn CompletionAdapter>> = vec![
            Arc::new(MockAdapter::new()),
            Arc::new(OpenAiAdapter::new("sk-test", "gpt-4o-mini")),
        ];
        let names: Vec<&str> = adapters.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["mock", "openai"]);

        let request = CompletionRequest::new().message(Message::user("hi"));
        let response = adapters[0]
            .complete(&Context::background(), &request)
            .await
            .unwrap();
        assert_eq!(response.tokens_used, 100);
    }

    #[test]
    fn adapters_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockAdapter>();
        assert_send_sync::<OpenAiAdapter>();
    }

    #[test]
    fn completion_stream_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<CompletionStream>();
    }
}
