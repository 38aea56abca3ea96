//! Plan / Step 模型与执行日志
//!
//! Planner、Controller 与工具之间流动的数据形状。Step 的 parameters 保持为裸 JSON，
//! 由派发层在执行前按各工具的 schema 校验（而不是在计划创建时）。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{AgentError, ErrorKind};

/// 计划中的一个步骤：声明的工具调用
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Step {
    /// 要调用的工具名，必须是注册表中已知的工具
    pub tool_name: String,
    /// 给用户看的自然语言描述；只用于展示与纠偏上下文，不参与执行
    pub summary: String,
    /// 工具参数，形状由各工具自己的 schema 决定
    #[serde(default)]
    pub parameters: Value,
}

/// 有序步骤列表。创建后不可变；纠偏时只能从游标处起整体替换剩余部分。
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Plan {
    pub plan: Vec<Step>,
}

impl Plan {
    /// 非空不变量在这里把关；Planner 解析 LLM 输出后必须经过此构造
    pub fn new(steps: Vec<Step>) -> Result<Self, AgentError> {
        if steps.is_empty() {
            return Err(AgentError::Planning("Plan contains no steps".to_string()));
        }
        Ok(Self { plan: steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.plan
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.plan
    }

    pub fn len(&self) -> usize {
        self.plan.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }
}

/// 每步执行结果，按序累积为 append-only 执行日志；
/// 审计之外也进入纠偏请求的上下文。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExecutionRecord {
    Success {
        tool_name: String,
        step_summary: String,
        output_summary: String,
    },
    Failure {
        tool_name: String,
        step_summary: String,
        kind: ErrorKind,
        message: String,
    },
}

impl ExecutionRecord {
    pub fn success(step: &Step, output_summary: impl Into<String>) -> Self {
        ExecutionRecord::Success {
            tool_name: step.tool_name.clone(),
            step_summary: step.summary.clone(),
            output_summary: output_summary.into(),
        }
    }

    pub fn failure(step: &Step, err: &AgentError) -> Self {
        ExecutionRecord::Failure {
            tool_name: step.tool_name.clone(),
            step_summary: step.summary.clone(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionRecord::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_parses_planner_wire_format() {
        // 与 Planner 输出的 JSON 形状一致
        let raw = json!({
            "plan": [
                {
                    "tool_name": "data_fetch",
                    "summary": "Fetch 2023 revenues for all clients.",
                    "parameters": {
                        "metric": "revenues",
                        "entities": ["all clients"],
                        "date_description": "2023",
                        "granularity": "client",
                        "output_variable": "rev_2023"
                    }
                }
            ]
        });
        let plan: Plan = serde_json::from_value(raw).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.steps()[0].tool_name, "data_fetch");
        assert_eq!(
            plan.steps()[0].parameters["output_variable"],
            json!("rev_2023")
        );
    }

    #[test]
    fn test_empty_plan_rejected() {
        let err = Plan::new(vec![]).unwrap_err();
        assert!(matches!(err, AgentError::Planning(_)));
    }

    #[test]
    fn test_step_without_parameters_defaults_to_null() {
        let raw = json!({"tool_name": "list_business_lines", "summary": "List lines."});
        let step: Step = serde_json::from_value(raw).unwrap();
        assert!(step.parameters.is_null());
    }

    #[test]
    fn test_execution_record_serializes_with_outcome_tag() {
        let step = Step {
            tool_name: "data_fetch".into(),
            summary: "Fetch.".into(),
            parameters: Value::Null,
        };
        let rec = ExecutionRecord::success(&step, "1 frame written");
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["outcome"], "success");

        let err = AgentError::UnknownTool("nope".into());
        let rec = ExecutionRecord::failure(&step, &err);
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["outcome"], "failure");
        assert_eq!(v["kind"], "unknown_tool");
    }
}
