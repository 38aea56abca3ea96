//! 工具派发：步骤 -> 统一的 ExecutionRecord
//!
//! 纯路由层：查注册表（UnknownTool）、调用工具（参数校验在工具内完成），
//! 把结果统一转为 Success / Failure 记录；每次调用输出结构化审计日志。
//! 除这一次调用外没有任何自己的副作用——写 Workspace 的是工具本身。

use std::time::Instant;

use serde_json::Value;

use crate::core::AgentError;
use crate::plan::{ExecutionRecord, Step};
use crate::tools::ToolRegistry;
use crate::workspace::Workspace;

/// 派发器：持有注册表
pub struct ToolDispatch {
    registry: ToolRegistry,
}

impl ToolDispatch {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// 执行一个步骤；所有错误都收敛为 Failure 记录，不向外抛
    pub async fn invoke(&self, step: &Step, workspace: &mut Workspace) -> ExecutionRecord {
        let start = Instant::now();
        let result = self.invoke_inner(step, workspace).await;

        let (ok, outcome) = match &result {
            Ok(_) => (true, "ok".to_string()),
            Err(e) => (false, format!("{:?}", e.kind())),
        };
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": step.tool_name,
            "ok": ok,
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
            "params_preview": params_preview(&step.parameters),
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        match result {
            Ok(output_summary) => ExecutionRecord::success(step, output_summary),
            Err(e) => ExecutionRecord::failure(step, &e),
        }
    }

    async fn invoke_inner(
        &self,
        step: &Step,
        workspace: &mut Workspace,
    ) -> Result<String, AgentError> {
        let tool = self
            .registry
            .get(&step.tool_name)
            .ok_or_else(|| AgentError::UnknownTool(step.tool_name.clone()))?;
        tool.execute(step.parameters.clone(), workspace).await
    }
}

fn params_preview(params: &Value) -> String {
    let s = params.to_string();
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use crate::tools::{InformUserTool, ToolRegistry};
    use serde_json::json;

    fn dispatch() -> ToolDispatch {
        let mut registry = ToolRegistry::new();
        registry.register(InformUserTool);
        ToolDispatch::new(registry)
    }

    fn step(tool_name: &str, parameters: Value) -> Step {
        Step {
            tool_name: tool_name.into(),
            summary: "A step.".into(),
            parameters,
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_yields_failure_record() {
        let d = dispatch();
        let mut ws = Workspace::new();
        let record = d.invoke(&step("nope", json!({})), &mut ws).await;
        match record {
            ExecutionRecord::Failure { kind, message, .. } => {
                assert_eq!(kind, ErrorKind::UnknownTool);
                assert!(message.contains("nope"));
            }
            _ => panic!("Expected failure record"),
        }
    }

    #[tokio::test]
    async fn test_invalid_parameters_yield_failure_record() {
        let d = dispatch();
        let mut ws = Workspace::new();
        // inform_user 需要字符串 message
        let record = d
            .invoke(&step("inform_user", json!({"message": 42})), &mut ws)
            .await;
        match record {
            ExecutionRecord::Failure { kind, .. } => {
                assert_eq!(kind, ErrorKind::InvalidParameters)
            }
            _ => panic!("Expected failure record"),
        }
    }

    #[tokio::test]
    async fn test_successful_invoke_yields_success_record() {
        let d = dispatch();
        let mut ws = Workspace::new();
        let record = d
            .invoke(&step("inform_user", json!({"message": "hi"})), &mut ws)
            .await;
        assert!(record.is_success());
        // 派发自身不写 Workspace
        assert!(ws.is_empty());
    }
}
