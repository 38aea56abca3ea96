//! 工具箱：分析工具与注册 / 派发
//!
//! 所有工具实现 Tool trait（name / description / parameters_schema / execute），
//! 由 ToolRegistry 按名注册与查找，ToolDispatch 统一校验参数并转 ExecutionRecord。
//! 工具自己负责把产出的 frame 写进 Workspace；派发层只路由，不落数据。

use async_trait::async_trait;
use serde_json::Value;

use crate::core::AgentError;
use crate::workspace::Workspace;

pub mod business_lines;
pub mod data_fetch;
pub mod describe;
pub mod dispatch;
pub mod inform;
pub mod registry;
pub mod transform;

pub use business_lines::ListBusinessLinesTool;
pub use data_fetch::DataFetchTool;
pub use describe::DescribeFrameTool;
pub use dispatch::ToolDispatch;
pub use inform::InformUserTool;
pub use registry::ToolRegistry;
pub use transform::TransformTool;

/// inform_user 的工具名；Controller 据此识别直达消息
pub const INFORM_USER_TOOL: &str = "inform_user";

/// 工具 trait：参数为裸 JSON，执行前按各自的 schema 反序列化校验；
/// 成功返回给执行日志的一句话摘要。
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名（计划中 "tool_name" 字段）
    fn name(&self) -> &str;

    /// 工具描述（拼进 Planner system prompt）
    fn description(&self) -> &str;

    /// 参数 JSON Schema（拼进 Planner system prompt，约束 LLM 输出）
    fn parameters_schema(&self) -> Value;

    /// 执行工具；工件通过 workspace.put 写入
    async fn execute(&self, params: Value, workspace: &mut Workspace)
        -> Result<String, AgentError>;
}

/// 统一的参数解析：serde 失败 -> InvalidParameters
pub(crate) fn parse_params<T: serde::de::DeserializeOwned>(
    tool: &str,
    params: Value,
) -> Result<T, AgentError> {
    serde_json::from_value(params).map_err(|e| AgentError::invalid_parameters(tool, e))
}
