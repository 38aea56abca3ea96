//! inform_user 工具：直接给用户发消息
//!
//! 用于无法满足的请求（如 revenues 按 country 过滤）。Controller 发现成功的
//! inform_user 步骤后，用其消息作为最终回答并跳过 Synthesizer。

use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::AgentError;
use crate::tools::{parse_params, Tool};
use crate::workspace::Workspace;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct InformUserParams {
    /// 原样转达给用户的消息
    pub message: String,
}

pub struct InformUserTool;

#[async_trait]
impl Tool for InformUserTool {
    fn name(&self) -> &str {
        "inform_user"
    }

    fn description(&self) -> &str {
        "Send a message directly to the user, e.g. to explain that a request cannot \
         be fulfilled. The message becomes the final answer."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schema_for!(InformUserParams)).unwrap_or_default()
    }

    async fn execute(
        &self,
        params: Value,
        _workspace: &mut Workspace,
    ) -> Result<String, AgentError> {
        let params: InformUserParams = parse_params("inform_user", params)?;
        Ok(params.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_message_passes_through() {
        let mut ws = Workspace::new();
        let out = InformUserTool
            .execute(json!({"message": "Cannot filter revenues by country."}), &mut ws)
            .await
            .unwrap();
        assert_eq!(out, "Cannot filter revenues by country.");
    }
}
