//! LLM 客户端抽象
//!
//! Planner 与 Synthesizer 都通过 LlmClient 访问模型；后端可为 OpenAI 兼容服务或 Mock。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::AgentError;

pub mod mock;
pub mod openai;

pub use mock::MockLlmClient;
pub use openai::OpenAiClient;

/// 消息角色（与 chat completions API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// 单条消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// LLM 客户端 trait：非流式完成；json_mode 要求模型只输出一个 JSON 对象
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], json_mode: bool)
        -> Result<String, AgentError>;
}
