//! Planner 协作方：查询 -> 计划，纠偏上下文 -> 续接计划
//!
//! Controller 只依赖 Planner trait；LLM 实现与脚本化测试替身都在这条缝后面。

use async_trait::async_trait;

use crate::core::{AgentError, CorrectionContext};
use crate::plan::Plan;

pub mod llm;
pub mod scripted;

pub use llm::LlmPlanner;
pub use scripted::ScriptedPlanner;

/// Planner 契约
#[async_trait]
pub trait Planner: Send + Sync {
    /// 把查询分解为计划；无法分解时返回 Planning 错误（不重试，直接升级）
    async fn create_plan(&self, query: &str) -> Result<Plan, AgentError>;

    /// 针对失败步骤给出续接计划；Ok(None) 表示没有可行的续接
    async fn correct_plan(
        &self,
        context: &CorrectionContext,
    ) -> Result<Option<Plan>, AgentError>;
}
