//! 纠偏协议：构建交回 Planner 的上下文，并把续接计划拼回剩余计划
//!
//! 两个纯函数：build_correction_context 只收集事实（原始查询、失败步骤、
//! 错误消息、Workspace schema 快照——只有结构没有数据）；splice_continuation
//! 从游标处起替换全部剩余步骤。已执行前缀与它写下的工件从不回滚。

use std::collections::BTreeMap;

use serde::Serialize;

use crate::plan::{Plan, Step};
use crate::workspace::FrameSchema;

/// Planner 续接请求的输入契约
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionContext {
    pub original_query: String,
    pub failed_step: Step,
    pub error_message: String,
    /// 工件名 -> 列签名；Planner 引用已有工件而不必重取
    pub workspace_schema_snapshot: BTreeMap<String, FrameSchema>,
}

/// 收集纠偏上下文（纯函数）
pub fn build_correction_context(
    original_query: &str,
    failed_step: &Step,
    error_message: &str,
    workspace_schema_snapshot: BTreeMap<String, FrameSchema>,
) -> CorrectionContext {
    CorrectionContext {
        original_query: original_query.to_string(),
        failed_step: failed_step.clone(),
        error_message: error_message.to_string(),
        workspace_schema_snapshot,
    }
}

/// 用续接计划替换 cursor 起的所有剩余步骤；前缀保持原样，无需重排日志
pub fn splice_continuation(steps: &mut Vec<Step>, cursor: usize, continuation: Plan) {
    steps.truncate(cursor);
    steps.extend(continuation.into_steps());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn step(name: &str) -> Step {
        Step {
            tool_name: name.to_string(),
            summary: format!("Run {}.", name),
            parameters: Value::Null,
        }
    }

    #[test]
    fn test_splice_replaces_cursor_to_end() {
        let mut steps = vec![step("a"), step("b"), step("c")];
        let continuation = Plan::new(vec![step("x"), step("y")]).unwrap();
        splice_continuation(&mut steps, 1, continuation);
        let names: Vec<&str> = steps.iter().map(|s| s.tool_name.as_str()).collect();
        assert_eq!(names, vec!["a", "x", "y"]);
    }

    #[test]
    fn test_splice_preserves_executed_prefix() {
        let mut steps = vec![step("a"), step("b")];
        let original_first = steps[0].clone();
        let continuation = Plan::new(vec![step("z")]).unwrap();
        splice_continuation(&mut steps, 1, continuation);
        assert_eq!(steps[0].tool_name, original_first.tool_name);
        assert_eq!(steps[0].summary, original_first.summary);
    }

    #[test]
    fn test_context_carries_failed_step_verbatim() {
        let failing = step("data_fetch");
        let ctx = build_correction_context(
            "top clients by growth",
            &failing,
            "upstream timeout",
            BTreeMap::new(),
        );
        assert_eq!(ctx.failed_step.summary, failing.summary);
        assert_eq!(ctx.error_message, "upstream timeout");
        assert!(ctx.workspace_schema_snapshot.is_empty());
    }
}
