//! Mock LLM 客户端（测试与离线演示用，无需 API Key）
//!
//! 按队列依次返回预置回复；队列空后重复最后一条。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::AgentError;
use crate::llm::{ChatMessage, LlmClient};

/// Mock 客户端：预置回复队列
#[derive(Debug, Default)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
}

impl MockLlmClient {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _json_mode: bool,
    ) -> Result<String, AgentError> {
        let mut queue = self.responses.lock().expect("mock lock");
        if let Some(next) = queue.pop_front() {
            *self.last.lock().expect("mock lock") = Some(next.clone());
            return Ok(next);
        }
        self.last
            .lock()
            .expect("mock lock")
            .clone()
            .ok_or_else(|| AgentError::Llm("Mock has no responses".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_queue_then_repeats_last() {
        let mock = MockLlmClient::new(vec!["a".into(), "b".into()]);
        assert_eq!(mock.complete(&[], false).await.unwrap(), "a");
        assert_eq!(mock.complete(&[], false).await.unwrap(), "b");
        assert_eq!(mock.complete(&[], false).await.unwrap(), "b");
    }

    #[tokio::test]
    async fn test_empty_mock_errors() {
        let mock = MockLlmClient::new(vec![]);
        assert!(mock.complete(&[], true).await.is_err());
    }
}
