//! services/api/src/adapters/completion_llm.rs
//!
//! This module contains the adapter for the chat-completion LLM.
//! It implements the `CompletionService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use study_content_core::{CompletionOptions, CompletionService, PortError, PortResult};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCompletionAdapter {
    /// `None` when no API key was configured.
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiCompletionAdapter {
    /// Creates a new `OpenAiCompletionAdapter`.
    ///
    /// Without an API key the adapter is still constructed, but every call fails with a
    /// configuration error before touching the network.
    pub fn new(api_key: Option<&str>, api_base: Option<&str>, model: String) -> Self {
        let client = api_key.map(|key| {
            let mut config = OpenAIConfig::new().with_api_key(key);
            if let Some(base) = api_base {
                config = config.with_api_base(base);
            }
            Client::with_config(config)
        });
        Self { client, model }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Builds a request carrying `prompt` as its single user message.
    fn build_request(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> PortResult<CreateChatCompletionRequest> {
        let messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| PortError::Provider(e.to_string()))?
                .into()];

        let model = options.model.as_deref().unwrap_or(&self.model);

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(options.temperature)
            .max_tokens(options.max_tokens)
            .top_p(options.top_p)
            .frequency_penalty(options.frequency_penalty)
            .presence_penalty(options.presence_penalty)
            .build()
            .map_err(|e| PortError::Provider(e.to_string()))?;

        Ok(request)
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiCompletionAdapter {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> PortResult<String> {
        let client = self.client.as_ref().ok_or_else(|| {
            PortError::Configuration("OPENAI_API_KEY is not set".to_string())
        })?;

        let request = self.build_request(prompt, options)?;
        debug!(model = %request.model, "Sending chat completion request");

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Provider(e.to_string()))?;

        // A response without choices or without text is an empty completion, not an error.
        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}
