//! Agent 错误类型
//!
//! 与 Controller 配合：按 ErrorKind 决定 原样重试 / 纠偏（Correcting）/ 升级（Escalated）。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 运行过程中可能出现的错误（规划、派发、工具执行、Workspace 取数等）
#[derive(Error, Debug)]
pub enum AgentError {
    /// 查询无法分解为计划；不重试，直接升级
    #[error("Planning failed: {0}")]
    Planning(String),

    /// 计划声明了未注册的工具（计划编写缺陷）
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// 参数不满足工具的 schema（计划编写缺陷）
    #[error("Invalid parameters for tool '{tool}': {message}")]
    InvalidParameters { tool: String, message: String },

    /// 工具运行期失败（上游 API、计算错误等），可能是瞬态的
    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    /// Workspace 中不存在该名字的 frame
    #[error("Frame '{0}' not found in workspace")]
    NotFound(String),

    /// Planner 无法给出可行的续接计划；终态升级
    #[error("Planner has no viable continuation")]
    NoViableContinuation,

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// 错误类别：进入执行日志与纠偏上下文的轻量标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Planning,
    UnknownTool,
    InvalidParameters,
    ToolExecution,
    NotFound,
    NoViableContinuation,
    Llm,
    JsonParse,
    Config,
}

impl ErrorKind {
    /// 同样输入重试是否可能产生不同结果。
    /// UnknownTool / InvalidParameters / NotFound 是确定性的：重复同样的调用必然重复同样的错误，
    /// Controller 对这类失败不消耗重试预算，直接进入 Correcting。
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::ToolExecution | ErrorKind::Llm)
    }
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::Planning(_) => ErrorKind::Planning,
            AgentError::UnknownTool(_) => ErrorKind::UnknownTool,
            AgentError::InvalidParameters { .. } => ErrorKind::InvalidParameters,
            AgentError::ToolExecutionFailed(_) => ErrorKind::ToolExecution,
            AgentError::NotFound(_) => ErrorKind::NotFound,
            AgentError::NoViableContinuation => ErrorKind::NoViableContinuation,
            AgentError::Llm(_) => ErrorKind::Llm,
            AgentError::JsonParse(_) => ErrorKind::JsonParse,
            AgentError::Config(_) => ErrorKind::Config,
        }
    }

    /// 参数校验失败的统一构造（serde 反序列化错误 -> InvalidParameters）
    pub fn invalid_parameters(tool: &str, err: impl std::fmt::Display) -> Self {
        AgentError::InvalidParameters {
            tool: tool.to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_kinds_are_not_retryable() {
        assert!(!ErrorKind::UnknownTool.is_retryable());
        assert!(!ErrorKind::InvalidParameters.is_retryable());
        assert!(!ErrorKind::NotFound.is_retryable());
    }

    #[test]
    fn test_runtime_kinds_are_retryable() {
        assert!(ErrorKind::ToolExecution.is_retryable());
        assert!(ErrorKind::Llm.is_retryable());
    }

    #[test]
    fn test_kind_mapping() {
        let err = AgentError::invalid_parameters("data_fetch", "missing field `metric`");
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
        assert!(err.to_string().contains("data_fetch"));
    }
}
