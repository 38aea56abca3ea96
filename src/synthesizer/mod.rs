//! Synthesizer 协作方：完成的 Workspace + 原始查询 -> 自然语言回答
//!
//! 只在 Completed 终态被调用；Escalated 短路跳过。

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::AgentError;
use crate::llm::{ChatMessage, LlmClient};
use crate::plan::ExecutionRecord;
use crate::workspace::Workspace;

/// prompt 中每个 frame 最多渲染的行数
const MAX_PROMPT_ROWS: usize = 50;

/// Synthesizer 契约
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn respond(
        &self,
        query: &str,
        workspace: &Workspace,
        log: &[ExecutionRecord],
    ) -> Result<String, AgentError>;
}

/// LLM Synthesizer：把各 frame 渲染成文本拼进 prompt
pub struct LlmSynthesizer {
    llm: Arc<dyn LlmClient>,
}

impl LlmSynthesizer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn build_prompt(&self, query: &str, workspace: &Workspace) -> String {
        let mut frames = String::new();
        for (name, frame) in workspace.iter() {
            frames.push_str(&format!(
                "\n--- Frame '{}' ---\n{}",
                name,
                frame.to_display_string(MAX_PROMPT_ROWS)
            ));
        }
        if frames.is_empty() {
            frames.push_str("(no frames were produced)");
        }
        format!(
            r#"You are an expert financial analyst assistant. Provide a clear, concise answer to the user's question based on the data below.

Original user query: "{query}"

Available data:
{frames}

Guidelines:
1. Answer the question directly; begin with a concise summary of the findings.
2. For rankings or lists, format the answer as a Markdown table with clean, human-readable headers.
3. For a single number, answer in a natural sentence with human-readable formatting (e.g. "$45.2 million").
4. Do not mention intermediate frame names; refer only to the final, meaningful data.
5. If the data cannot answer the question, state clearly what is missing."#,
        )
    }
}

#[async_trait]
impl Synthesizer for LlmSynthesizer {
    async fn respond(
        &self,
        query: &str,
        workspace: &Workspace,
        _log: &[ExecutionRecord],
    ) -> Result<String, AgentError> {
        let prompt = self.build_prompt(query, workspace);
        let messages = vec![
            ChatMessage::system("You are a helpful financial analyst assistant."),
            ChatMessage::user(prompt),
        ];
        self.llm.complete(&messages, false).await
    }
}
