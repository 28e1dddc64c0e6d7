//! Prompt-driven content generation for catalogued tools.
//!
//! Each operation looks the tool up, fills a fixed prompt and forwards it to
//! the chat-completion provider. Structured answers are deserialized into
//! typed shapes before they leave the service; nothing is persisted.

use std::fmt;

use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::db::{DBClient, ToolExt};
use crate::dtos::{ChatCompletionRequest, ChatMessage, GeneratedBundle, ResponseFormat};
use crate::error::{ErrorMessage, GenerationKind, HttpError};
use crate::http::{LlmClient, UpstreamError};

pub mod prompts;
mod schema;

pub use schema::{ContentType, Course, CourseLevel, Difficulty, NewsArticle, Tutorial};

use prompts::Sampling;

const DEFAULT_CATEGORY: &str = "AI tools";

/// The tool fields prompts are built from.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ToolContext {
    pub name: String,
    pub description: String,
    pub url: String,
    pub category_name: Option<String>,
}

impl ToolContext {
    pub fn category_name(&self) -> &str {
        self.category_name.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }
}

/// Read-only tool lookup used by the generators.
pub trait ToolSource {
    async fn tool_context(&self, tool_id: Uuid) -> Result<Option<ToolContext>, sqlx::Error>;
}

impl ToolSource for DBClient {
    async fn tool_context(&self, tool_id: Uuid) -> Result<Option<ToolContext>, sqlx::Error> {
        self.get_tool_context(tool_id).await
    }
}

#[derive(Debug)]
pub enum GenerationError {
    ToolNotFound,
    Storage(sqlx::Error),
    Provider(UpstreamError),
    InvalidOutput(serde_json::Error),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::ToolNotFound => write!(f, "tool not found"),
            GenerationError::Storage(e) => write!(f, "tool lookup failed: {}", e),
            GenerationError::Provider(e) => write!(f, "provider call failed: {}", e),
            GenerationError::InvalidOutput(e) => write!(f, "model output rejected: {}", e),
        }
    }
}

impl std::error::Error for GenerationError {}

impl GenerationError {
    /// Client-facing error. A missing tool is a 500 "Tool not found" like
    /// every other generation failure; the remaining causes are logged and
    /// replaced by the generic message for `kind`.
    pub fn into_http_error(self, kind: GenerationKind) -> HttpError {
        match self {
            GenerationError::ToolNotFound => {
                tracing::warn!(?kind, "generation requested for unknown tool");
                HttpError::server_error(ErrorMessage::ToolNotFound.to_string())
            }
            other => {
                tracing::error!(?kind, "Generation error: {}", other);
                HttpError::server_error(ErrorMessage::GenerationFailed(kind).to_string())
            }
        }
    }
}

/// Ids arrive as free strings; anything that is not a UUID cannot name a tool.
fn parse_tool_id(tool_id: &str) -> Option<Uuid> {
    Uuid::parse_str(tool_id.trim()).ok()
}

pub struct ContentGenerator<'a, S> {
    source: &'a S,
    llm: &'a LlmClient,
}

impl<'a, S: ToolSource> ContentGenerator<'a, S> {
    pub fn new(source: &'a S, llm: &'a LlmClient) -> Self {
        Self { source, llm }
    }

    async fn lookup(&self, tool_id: &str) -> Result<Option<ToolContext>, GenerationError> {
        match parse_tool_id(tool_id) {
            Some(id) => self
                .source
                .tool_context(id)
                .await
                .map_err(GenerationError::Storage),
            None => Ok(None),
        }
    }

    async fn require_tool(&self, tool_id: &str) -> Result<ToolContext, GenerationError> {
        self.lookup(tool_id)
            .await?
            .ok_or(GenerationError::ToolNotFound)
    }

    async fn complete(
        &self,
        system: &str,
        prompt: String,
        sampling: Sampling,
    ) -> Result<String, GenerationError> {
        let request = ChatCompletionRequest {
            model: self.llm.model_name().to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            response_format: sampling.json_object.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        self.llm
            .chat(&request)
            .await
            .map_err(GenerationError::Provider)
    }

    async fn complete_json<T: DeserializeOwned>(
        &self,
        system: &str,
        prompt: String,
        sampling: Sampling,
    ) -> Result<T, GenerationError> {
        let raw = self.complete(system, prompt, sampling).await?;
        serde_json::from_str(&raw).map_err(GenerationError::InvalidOutput)
    }

    /// Plain-text description, feature list or benefit list.
    pub async fn generate_content(
        &self,
        tool_id: &str,
        content_type: ContentType,
    ) -> Result<String, GenerationError> {
        let tool = self.require_tool(tool_id).await?;
        self.complete(
            prompts::CONTENT_SYSTEM,
            prompts::content_prompt(&tool, content_type),
            prompts::CONTENT_SAMPLING,
        )
        .await
    }

    /// News article on `topic`. An unknown `tool_id` only drops the tool
    /// background from the prompt.
    pub async fn generate_news(
        &self,
        topic: &str,
        tool_id: Option<&str>,
    ) -> Result<NewsArticle, GenerationError> {
        let tool = match tool_id {
            Some(id) => self.lookup(id).await?,
            None => None,
        };
        let context = prompts::news_tool_context(tool.as_ref());

        self.complete_json(
            prompts::NEWS_SYSTEM,
            prompts::news_prompt(topic, &context),
            prompts::NEWS_SAMPLING,
        )
        .await
    }

    pub async fn generate_tutorial(
        &self,
        tool_id: &str,
        difficulty: Difficulty,
    ) -> Result<Tutorial, GenerationError> {
        let tool = self.require_tool(tool_id).await?;
        self.complete_json(
            prompts::TUTORIAL_SYSTEM,
            prompts::tutorial_prompt(&tool, difficulty),
            prompts::TUTORIAL_SAMPLING,
        )
        .await
    }

    pub async fn generate_course(
        &self,
        tool_id: &str,
        level: CourseLevel,
    ) -> Result<Course, GenerationError> {
        let tool = self.require_tool(tool_id).await?;
        self.complete_json(
            prompts::COURSE_SYSTEM,
            prompts::course_prompt(&tool, level),
            prompts::COURSE_SAMPLING,
        )
        .await
    }

    /// Description, news, beginner tutorial and intermediate course, run
    /// concurrently. The first failure fails the whole bundle.
    pub async fn generate_all(&self, tool_id: &str) -> Result<GeneratedBundle, HttpError> {
        let topic = format!("Latest updates about {}", tool_id);

        let description = async {
            self.generate_content(tool_id, ContentType::Description)
                .await
                .map_err(|e| e.into_http_error(GenerationKind::Content))
        };
        let news = async {
            self.generate_news(&topic, Some(tool_id))
                .await
                .map_err(|e| e.into_http_error(GenerationKind::News))
        };
        let tutorial = async {
            self.generate_tutorial(tool_id, Difficulty::Beginner)
                .await
                .map_err(|e| e.into_http_error(GenerationKind::Tutorial))
        };
        let course = async {
            self.generate_course(tool_id, CourseLevel::Intermediate)
                .await
                .map_err(|e| e.into_http_error(GenerationKind::Course))
        };

        let (description, news, tutorial, course) =
            tokio::try_join!(description, news, tutorial, course)?;

        Ok(GeneratedBundle {
            description,
            news,
            tutorial,
            course,
        })
    }
}
