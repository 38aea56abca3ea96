//! LLM Planner：system prompt 注入工具 schema，解析 JSON 输出为 Plan
//!
//! prompt 由三部分拼成：策略原则（少量多步、先 describe 再 transform、
//! 维度校验不通过就 inform_user）、注册表导出的工具 schema、Plan 的 JSON Schema。

use std::collections::BTreeMap;
use std::sync::Arc;

use schemars::schema_for;

use async_trait::async_trait;

use crate::core::{AgentError, CorrectionContext};
use crate::llm::{ChatMessage, LlmClient};
use crate::plan::Plan;
use crate::planner::Planner;
use crate::workspace::FrameSchema;

/// LLM Planner：持有 LlmClient 与构建好的 system prompt
pub struct LlmPlanner {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl LlmPlanner {
    /// tools_schema_json 来自 ToolRegistry::to_schema_json
    pub fn new(llm: Arc<dyn LlmClient>, tools_schema_json: &str) -> Self {
        Self {
            llm,
            system_prompt: build_system_prompt(tools_schema_json),
        }
    }

    pub fn base_system_prompt(&self) -> &str {
        &self.system_prompt
    }

    async fn plan_from_messages(&self, messages: Vec<ChatMessage>) -> Result<Plan, AgentError> {
        let output = self.llm.complete(&messages, true).await?;
        let plan = parse_plan_output(&output)?;
        Plan::new(plan.into_steps())
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn create_plan(&self, query: &str) -> Result<Plan, AgentError> {
        let messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(query.to_string()),
        ];
        self.plan_from_messages(messages)
            .await
            .map_err(|e| AgentError::Planning(e.to_string()))
    }

    async fn correct_plan(
        &self,
        context: &CorrectionContext,
    ) -> Result<Option<Plan>, AgentError> {
        let messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(render_correction_prompt(context)),
        ];
        let output = self.llm.complete(&messages, true).await?;
        let plan = parse_plan_output(&output)?;
        // 空计划即「没有可行的续接」
        if plan.is_empty() {
            return Ok(None);
        }
        Ok(Some(plan))
    }
}

/// 从 LLM 输出中提取 JSON（容忍 ```json 围栏与前后杂文）并解析为 Plan
pub fn parse_plan_output(output: &str) -> Result<Plan, AgentError> {
    let trimmed = output.trim();

    let json_str = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```")
            .map(|end| rest[..end].trim())
            .unwrap_or_else(|| rest.trim())
    } else if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        &trimmed[start..=end]
    } else {
        return Err(AgentError::JsonParse(format!(
            "No JSON object in planner output: {}",
            preview(trimmed)
        )));
    };

    serde_json::from_str(json_str)
        .map_err(|e| AgentError::JsonParse(format!("{}: {}", e, preview(json_str))))
}

fn preview(s: &str) -> String {
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s.to_string()
    }
}

fn build_system_prompt(tools_schema_json: &str) -> String {
    let plan_schema = serde_json::to_string_pretty(&schema_for!(Plan))
        .unwrap_or_else(|_| "{}".to_string());
    format!(
        r#"You are an expert financial analyst assistant. Decompose the user's question into a series of discrete, executable steps.

Strategic principles:
1. Prefer multiple simple steps over one complex step.
2. For queries comparing two time periods, use two separate `data_fetch` calls.
3. Before any `transform` on a frame, first use `describe_frame` on it so column names are exact. Do not guess.
4. Derived metrics (e.g. Return on Balances = revenues / balances) are computed with `transform` from separately fetched frames.
5. When unsure about valid business lines, call `list_business_lines` first.
6. When the user asks for a breakdown "by" a dimension, set `granularity` to that dimension; use "aggregate" only for a single total.
7. revenues can be filtered by region but NOT by country; capital supports neither region nor country. For unsupported combinations, emit a single `inform_user` step explaining why instead of fetching.

Available tools (name, description, parameter schema):
{tools}

The JSON object you output MUST conform to this schema:
{schema}

For each step provide `tool_name`, a user-friendly `summary`, and `parameters`.
Respond with ONLY the JSON object."#,
        tools = tools_schema_json,
        schema = plan_schema,
    )
}

/// 把纠偏上下文渲染为续接请求的 user prompt
pub fn render_correction_prompt(context: &CorrectionContext) -> String {
    format!(
        r#"The previous plan failed during a step. Create a new plan to achieve the original user goal.

Original user query: {query}

The failing step was: "{summary}"
It failed with the error: {error}

Current workspace state (frames you may reference without re-fetching):
{workspace}

Create a corrected plan that recovers from this error and completes the original request. If no recovery is possible, respond with {{"plan": []}}."#,
        query = context.original_query,
        summary = context.failed_step.summary,
        error = context.error_message,
        workspace = render_snapshot(&context.workspace_schema_snapshot),
    )
}

fn render_snapshot(snapshot: &BTreeMap<String, FrameSchema>) -> String {
    if snapshot.is_empty() {
        return "(empty)".to_string();
    }
    snapshot
        .iter()
        .map(|(name, schema)| format!("- {}: {}", name, schema))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::build_correction_context;
    use crate::llm::MockLlmClient;
    use crate::plan::Step;
    use serde_json::Value;

    const PLAN_JSON: &str = r#"{"plan": [{"tool_name": "list_business_lines", "summary": "List lines.", "parameters": {}}]}"#;

    #[test]
    fn test_parse_plain_json() {
        let plan = parse_plan_output(PLAN_JSON).unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("Here is the plan:\n```json\n{}\n```", PLAN_JSON);
        let plan = parse_plan_output(&fenced).unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_parse_prose_fails() {
        assert!(parse_plan_output("I cannot plan this.").is_err());
    }

    #[tokio::test]
    async fn test_create_plan_via_mock() {
        let planner = LlmPlanner::new(Arc::new(MockLlmClient::new(vec![PLAN_JSON.into()])), "[]");
        let plan = planner.create_plan("list the lines").await.unwrap();
        assert_eq!(plan.steps()[0].tool_name, "list_business_lines");
    }

    #[tokio::test]
    async fn test_empty_continuation_means_no_viable_plan() {
        let planner = LlmPlanner::new(
            Arc::new(MockLlmClient::new(vec![r#"{"plan": []}"#.into()])),
            "[]",
        );
        let failed = Step {
            tool_name: "data_fetch".into(),
            summary: "Fetch.".into(),
            parameters: Value::Null,
        };
        let ctx = build_correction_context("q", &failed, "boom", Default::default());
        assert!(planner.correct_plan(&ctx).await.unwrap().is_none());
    }

    #[test]
    fn test_correction_prompt_mentions_failure_and_workspace() {
        let failed = Step {
            tool_name: "data_fetch".into(),
            summary: "Fetch 2024 revenues.".into(),
            parameters: Value::Null,
        };
        let ctx = build_correction_context(
            "top clients by growth",
            &failed,
            "upstream timeout",
            Default::default(),
        );
        let prompt = render_correction_prompt(&ctx);
        assert!(prompt.contains("Fetch 2024 revenues."));
        assert!(prompt.contains("upstream timeout"));
        assert!(prompt.contains("(empty)"));
    }
}
