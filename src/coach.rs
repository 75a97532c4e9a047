//! Craving coach backed by a hosted language model.
//!
//! The model is reached through the [`LanguageModel`] trait so the
//! conversation flow can run against [`GeminiClient`] in production and a
//! stub in tests. Model failures never reach the caller: they are logged and
//! replaced with a static reply.

use crate::models::{ChatMessage, Role};
use crate::repository::Repository;
use crate::storage::StorageError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Number of earlier turns sent along with a new message.
pub const HISTORY_WINDOW: usize = 10;

pub const GREETING_ID: &str = "init";

pub const GREETING: &str = "Hi! I'm your accountability coach. I know you want to stop snacking \
before and after dinner. If you feel an urge right now, tell me. I'm here to help you ride the wave.";

pub const FALLBACK_REPLY: &str = "I'm having trouble connecting right now, but remember: urges \
are like waves. They rise and then they fall. Ride it out.";

pub const FALLBACK_MOTIVATION: &str = "Every healthy choice is a victory.";

pub const EMPTY_MOTIVATION: &str = "You are stronger than your cravings.";

const MOTIVATION_PROMPT: &str = "Generate a short, powerful, one-sentence motivation quote \
for someone avoiding night-time snacking.";

pub const SYSTEM_INSTRUCTION: &str = "You are a distraction-focused diet coach for someone \
trying to stop binge-eating snacks at night.
Rule 1: be extremely concise, two or three sentences at most.
Rule 2: if the user reports an urge, distract them immediately.

Modes the user can ask for:
- COACHING: short, practical advice.
- TRIVIA: ask one general-knowledge question without the answer, wait for a guess, \
react to it, then ask the next question straight away until the user says stop.
- BREATHING: guide one 4-7-8 cycle (inhale 4s, hold 7s, exhale 8s).
- JOKE: one clean joke.
- VISION: describe the user a few months from now at their goal weight, energetic and happy.
- NEWS: one brief positive or quirky story from this week, ending with a Google search link \
for the topic.
- QUOTE: one inspiring quote about health, discipline or self-improvement, with the author if known.

Outside those modes, rotate between 5-4-3-2-1 grounding, this-or-that questions and quick \
mental math challenges.";

#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    #[error("no API credential configured")]
    MissingCredential,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text")]
    EmptyResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub system_instruction: Option<String>,
    pub history: Vec<Turn>,
    pub message: String,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, CoachError>;
}

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, CoachError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

fn request_body(request: &GenerateRequest) -> GenerateContentBody<'_> {
    let mut contents: Vec<Content<'_>> = request
        .history
        .iter()
        .map(|turn| Content {
            role: Some(wire_role(turn.role)),
            parts: vec![Part { text: &turn.text }],
        })
        .collect();
    contents.push(Content {
        role: Some("user"),
        parts: vec![Part {
            text: &request.message,
        }],
    });

    GenerateContentBody {
        system_instruction: request.system_instruction.as_deref().map(|text| Content {
            role: None,
            parts: vec![Part { text }],
        }),
        contents,
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, CoachError> {
        let api_key = self.api_key.as_deref().ok_or(CoachError::MissingCredential)?;

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(CoachError::Api { status, message });
        }

        let body: GenerateContentResponse = response.json().await?;
        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(CoachError::EmptyResponse);
        }
        Ok(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub user: ChatMessage,
    pub reply: ChatMessage,
    pub fallback: bool,
}

pub fn greeting(now_millis: i64) -> ChatMessage {
    ChatMessage {
        id: GREETING_ID.to_string(),
        role: Role::Assistant,
        text: GREETING.to_string(),
        timestamp: now_millis,
    }
}

/// Millisecond ids, bumped past the newest numeric id already in `history`.
pub fn next_message_id(history: &[ChatMessage], now_millis: i64) -> String {
    let newest = history
        .iter()
        .filter_map(|message| message.id.parse::<i64>().ok())
        .max();
    match newest {
        Some(newest) if newest >= now_millis => (newest + 1).to_string(),
        _ => now_millis.to_string(),
    }
}

/// Sends `text` to the coach and records both sides of the exchange.
///
/// The model sees a snapshot of the history; the exchange is appended to
/// whatever is stored once the reply arrives, so overlapping calls each keep
/// their messages.
pub async fn converse(
    repository: &Repository,
    model: &dyn LanguageModel,
    text: &str,
    now_millis: i64,
) -> Result<Exchange, StorageError> {
    let mut snapshot = repository.chat_history().await;
    if snapshot.is_empty() {
        snapshot.push(greeting(now_millis));
    }

    let window_start = snapshot.len().saturating_sub(HISTORY_WINDOW);
    let request = GenerateRequest {
        system_instruction: Some(SYSTEM_INSTRUCTION.to_string()),
        history: snapshot[window_start..]
            .iter()
            .map(|message| Turn {
                role: message.role,
                text: message.text.clone(),
            })
            .collect(),
        message: text.to_string(),
    };

    let (reply_text, fallback) = match model.generate(&request).await {
        Ok(reply) => (reply, false),
        Err(err) => {
            warn!("coach unavailable, using fallback reply: {err}");
            (FALLBACK_REPLY.to_string(), true)
        }
    };

    let user_text = text.to_string();
    let (user, reply, messages) = repository
        .update_chat_history(move |history| {
            if history.is_empty() {
                history.push(greeting(now_millis));
            }
            let user = ChatMessage {
                id: next_message_id(history, now_millis),
                role: Role::User,
                text: user_text,
                timestamp: now_millis,
            };
            history.push(user.clone());
            let reply = ChatMessage {
                id: next_message_id(history, now_millis),
                role: Role::Assistant,
                text: reply_text,
                timestamp: now_millis,
            };
            history.push(reply.clone());
            (user, reply, history.len())
        })
        .await?;
    info!(messages, fallback, "coach exchange recorded");

    Ok(Exchange {
        user,
        reply,
        fallback,
    })
}

pub async fn motivation(model: &dyn LanguageModel) -> String {
    let request = GenerateRequest {
        system_instruction: None,
        history: Vec::new(),
        message: MOTIVATION_PROMPT.to_string(),
    };

    match model.generate(&request).await {
        Ok(quote) if !quote.trim().is_empty() => quote,
        Ok(_) | Err(CoachError::EmptyResponse) => EMPTY_MOTIVATION.to_string(),
        Err(err) => {
            warn!("motivation unavailable: {err}");
            FALLBACK_MOTIVATION.to_string()
        }
    }
}
