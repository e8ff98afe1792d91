// src/llm/chat.rs
// Chat completion model abstraction

use async_trait::async_trait;
use tracing::debug;

use super::client::ChatRequest;
use super::{Message, OpenAIClient};
use crate::error::Result;
use crate::prompt::RenderedPrompt;

/// Anything that can turn a rendered prompt into raw answer text
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String>;

    /// Model identifier, for logging
    fn name(&self) -> &str;
}

pub struct OpenAiChatModel {
    client: OpenAIClient,
    model: String,
    temperature: f32,
}

impl OpenAiChatModel {
    pub fn new(client: OpenAIClient, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }

    fn build_request(&self, prompt: &RenderedPrompt) -> ChatRequest {
        ChatRequest::new(
            self.model.clone(),
            vec![Message::system(&prompt.system), Message::user(&prompt.user)],
        )
        .with_temperature(self.temperature)
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String> {
        let request = self.build_request(prompt);
        debug!(model = %self.model, "Sending chat completion");
        self.client.chat_completion(&request).await
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_uses_system_and_user() {
        let model = OpenAiChatModel::new(OpenAIClient::new("sk", "http://localhost"), "gpt-4o-mini", 0.4);
        let prompt = RenderedPrompt {
            system: "persona".to_string(),
            user: "question block".to_string(),
        };
        let req = model.build_request(&prompt);
        assert_eq!(req.model, "gpt-4o-mini");
        assert_eq!(req.temperature, Some(0.4));
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0], Message::system("persona"));
        assert_eq!(req.messages[1], Message::user("question block"));
    }
}
