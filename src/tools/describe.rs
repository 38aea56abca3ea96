//! describe_frame 工具：查看 Workspace 中某个 frame 的结构
//!
//! transform 之前的必经步骤：Planner 先看到确切列名再写后续操作，而不是猜。

use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::AgentError;
use crate::tools::{parse_params, Tool};
use crate::workspace::Workspace;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DescribeFrameParams {
    /// Workspace 中要查看的 frame 名
    pub frame_name: String,
}

pub struct DescribeFrameTool;

#[async_trait]
impl Tool for DescribeFrameTool {
    fn name(&self) -> &str {
        "describe_frame"
    }

    fn description(&self) -> &str {
        "Return the schema (column names and dtypes) of a frame already in the \
         workspace. Always use this before a transform step so column names are exact."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schema_for!(DescribeFrameParams)).unwrap_or_default()
    }

    async fn execute(
        &self,
        params: Value,
        workspace: &mut Workspace,
    ) -> Result<String, AgentError> {
        let params: DescribeFrameParams = parse_params("describe_frame", params)?;
        let schema = workspace.describe(&params.frame_name)?;
        Ok(format!("Frame '{}' has columns {}", params.frame_name, schema))
    }
}
