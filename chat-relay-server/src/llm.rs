use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestDeveloperMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, CreateChatCompletionStreamResponse,
    },
    Client,
};
use async_trait::async_trait;
use chat_relay_shared::{ChatMessage, MessageRole};
use futures_util::{stream::BoxStream, StreamExt};
use tracing::{debug, info};

use crate::error::RelayError;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that provides accurate and polite responses. Please help the user in the most effective way possible.";

pub type ChunkStream = BoxStream<'static, Result<CompletionChunk, RelayError>>;

/// One streamed unit from upstream. Metadata-only chunks (role announcement,
/// finish reason, usage) carry no delta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionChunk {
    pub delta: Option<String>,
}

impl CompletionChunk {
    pub fn text(delta: impl Into<String>) -> Self {
        Self {
            delta: Some(delta.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The text to forward, if any.
    pub fn content(&self) -> Option<&str> {
        self.delta.as_deref().filter(|d| !d.is_empty())
    }
}

impl From<CreateChatCompletionStreamResponse> for CompletionChunk {
    fn from(response: CreateChatCompletionStreamResponse) -> Self {
        let delta = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content);
        Self { delta }
    }
}

/// `[system prompt] ++ messages`, caller order untouched.
pub fn with_system_prompt(messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut full = Vec::with_capacity(1 + messages.len());
    full.push(ChatMessage::new(MessageRole::System, SYSTEM_PROMPT));
    full.extend(messages);
    full
}

/// A streaming chat completion provider.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn stream_completion(
        &self,
        api_key: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<ChunkStream, RelayError>;
}

pub struct OpenAiBackend {
    model: String,
    api_base: Option<String>,
}

impl OpenAiBackend {
    pub fn new(model: String, api_base: Option<String>) -> Self {
        info!("Initializing OpenAI backend with model: {}", model);
        Self { model, api_base }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self, api_key: &str) -> Client<OpenAIConfig> {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = &self.api_base {
            config = config.with_api_base(base);
        }
        Client::with_config(config)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn stream_completion(
        &self,
        api_key: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<ChunkStream, RelayError> {
        let messages = messages
            .into_iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .stream(true)
            .build()?;

        debug!(
            "Sending {} messages to {}",
            request.messages.len(),
            self.model
        );

        let stream = self
            .client(api_key)
            .chat()
            .create_stream(request)
            .await?;

        Ok(stream
            .map(|item| item.map(CompletionChunk::from).map_err(RelayError::from))
            .boxed())
    }
}

fn to_request_message(msg: ChatMessage) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    let message = match msg.role {
        MessageRole::System => ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(msg.content)
                .build()?,
        ),
        MessageRole::Developer => ChatCompletionRequestMessage::Developer(
            ChatCompletionRequestDeveloperMessageArgs::default()
                .content(msg.content)
                .build()?,
        ),
        MessageRole::User => ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(msg.content)
                .build()?,
        ),
        MessageRole::Assistant => ChatCompletionRequestMessage::Assistant(
            ChatCompletionRequestAssistantMessageArgs::default()
                .content(msg.content)
                .build()?,
        ),
        // Tool and function turns need fields a plain `{role, content}` message lacks.
        MessageRole::Other(role) => {
            return Err(OpenAIError::InvalidArgument(format!(
                "role `{role}` cannot be sent as a plain chat message"
            )));
        }
    };
    Ok(message)
}
