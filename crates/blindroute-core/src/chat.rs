//! Chat-completion bridge behind `POST /api/chat`.
//!
//! Chat mode answers conversationally and flags navigation intent with a sentinel the
//! model is told to emit verbatim. Blindroute mode extracts "start,destination".

use crate::error::{CoreError, CoreResult};
use crate::gateway::{ChatAssistant, ChatMode, ChatReply};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Sentinel the chat-mode prompt asks for when the user wants directions.
pub const NAVIGATION_SENTINEL: &str = "BLINDROUTE";

const CHAT_SYSTEM_PROMPT: &str = "You are a friendly AI assistant for blind and low-vision users. \
Answer in Korean, in at most two short sentences, with no markdown, lists or emoji: the reply is read aloud. \
If the user asks for directions, a route, or help taking a bus somewhere, reply with exactly BLINDROUTE and nothing else.";

const BLINDROUTE_SYSTEM_PROMPT: &str = "Extract the departure and the destination from the user's sentence. \
Reply with exactly two place names separated by a single comma, departure first (e.g. 강남역,서울역). \
If either place is missing, reply with an empty string.";

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Option<Vec<CompletionChoice>>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completion client (OpenRouter by default).
#[derive(Debug, Clone)]
pub struct CompletionChat {
    url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl CompletionChat {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            url: url.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        })
    }

    async fn complete(&self, system: &str, user: &str) -> CoreResult<String> {
        let body = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            stream: Some(false),
        };

        let res = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(CoreError::Upstream {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: CompletionResponse = serde_json::from_str(&text)?;
        Ok(parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default())
    }
}

/// Map raw model output to a reply for the given mode.
pub fn interpret_completion(content: &str, mode: ChatMode) -> ChatReply {
    let content = content.trim();
    match mode {
        ChatMode::Chat if content.contains(NAVIGATION_SENTINEL) => ChatReply {
            chat_mode: ChatMode::Blindroute,
            message: String::new(),
        },
        ChatMode::Chat => ChatReply {
            chat_mode: ChatMode::Chat,
            message: content.to_string(),
        },
        ChatMode::Blindroute => ChatReply {
            chat_mode: ChatMode::Blindroute,
            message: content.replace(['\n', '"'], "").replace(", ", ","),
        },
    }
}

#[async_trait::async_trait]
impl ChatAssistant for CompletionChat {
    async fn reply(&self, message: &str, mode: ChatMode) -> CoreResult<ChatReply> {
        let system = match mode {
            ChatMode::Chat => CHAT_SYSTEM_PROMPT,
            ChatMode::Blindroute => BLINDROUTE_SYSTEM_PROMPT,
        };
        let content = self.complete(system, message).await?;
        let reply = interpret_completion(&content, mode);
        info!("[CHAT] mode {:?} -> {:?}", mode, reply.chat_mode);
        Ok(reply)
    }
}
