//! transform 工具：对 Workspace 中的 frame 做声明式流水线计算
//!
//! 任意代码执行的受限替代：只暴露 merge / with_column / sort_by / head / select
//! 这几个能力，输入输出都走 Workspace 命名约定（读已有 frame，结果写到
//! output_variable）。派生指标（如 RoB = revenues / balances）也由它计算。

use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::AgentError;
use crate::tools::{parse_params, Tool};
use crate::workspace::{ArithOp, Frame, Workspace};

fn default_suffixes() -> (String, String) {
    ("_x".to_string(), "_y".to_string())
}

/// 流水线中的一步操作
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum TransformOp {
    /// 与另一个 Workspace frame 按 on 列内连接；重名列加后缀
    Merge {
        right: String,
        on: String,
        #[serde(default = "default_suffixes")]
        suffixes: (String, String),
    },
    /// 新增列 name = left <operator> right（两个已有数值列）
    WithColumn {
        name: String,
        left: String,
        operator: ArithOp,
        right: String,
    },
    /// 按列排序
    SortBy {
        column: String,
        #[serde(default)]
        descending: bool,
    },
    /// 保留前 n 行
    Head { n: usize },
    /// 列投影
    Select { columns: Vec<String> },
}

/// transform 参数
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TransformParams {
    /// 起始 frame 名
    pub input: String,
    /// 依序执行的操作
    pub ops: Vec<TransformOp>,
    /// 结果写入的 frame 名
    pub output_variable: String,
}

pub struct TransformTool;

impl TransformTool {
    fn apply(
        frame: Frame,
        op: &TransformOp,
        workspace: &Workspace,
    ) -> Result<Frame, AgentError> {
        match op {
            TransformOp::Merge { right, on, suffixes } => {
                let right_frame = workspace.get(right)?;
                frame.merge(right_frame, on, (&suffixes.0, &suffixes.1))
            }
            TransformOp::WithColumn {
                name,
                left,
                operator,
                right,
            } => frame.with_column(name, left, *operator, right),
            TransformOp::SortBy { column, descending } => frame.sort_by(column, *descending),
            TransformOp::Head { n } => Ok(frame.head(*n)),
            TransformOp::Select { columns } => frame.select(columns),
        }
    }
}

#[async_trait]
impl Tool for TransformTool {
    fn name(&self) -> &str {
        "transform"
    }

    fn description(&self) -> &str {
        "Apply a pipeline of frame operations (merge, with_column arithmetic, sort_by, \
         head, select) starting from an existing workspace frame, and write the result \
         under `output_variable`. Use describe_frame first so column names are exact."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schema_for!(TransformParams)).unwrap_or_default()
    }

    async fn execute(
        &self,
        params: Value,
        workspace: &mut Workspace,
    ) -> Result<String, AgentError> {
        let params: TransformParams = parse_params("transform", params)?;
        if params.output_variable.trim().is_empty() {
            return Err(AgentError::invalid_parameters(
                "transform",
                "output_variable must not be empty",
            ));
        }

        let mut frame = workspace.get(&params.input)?.clone();
        for op in &params.ops {
            frame = Self::apply(frame, op, workspace)?;
        }
        let rows = frame.len();
        workspace.put(&params.output_variable, frame);
        Ok(format!(
            "Wrote frame '{}' ({} rows)",
            params.output_variable, rows
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use crate::workspace::Cell;
    use serde_json::json;

    fn revenue_frame(values: &[(&str, f64)]) -> Frame {
        let mut f = Frame::new(vec!["client_id".into(), "revenues".into()]);
        for (id, v) in values {
            f.push_row(vec![Cell::Str(id.to_string()), Cell::Float(*v)])
                .unwrap();
        }
        f
    }

    #[tokio::test]
    async fn test_growth_pipeline() {
        let mut ws = Workspace::new();
        ws.put(
            "rev_2023",
            revenue_frame(&[("cl_id_citadel", 100.0), ("cl_id_millennium", 300.0)]),
        );
        ws.put(
            "rev_2024",
            revenue_frame(&[("cl_id_citadel", 250.0), ("cl_id_millennium", 320.0)]),
        );

        TransformTool
            .execute(
                json!({
                    "input": "rev_2024",
                    "ops": [
                        {"op": "merge", "right": "rev_2023", "on": "client_id",
                         "suffixes": ["_2024", "_2023"]},
                        {"op": "with_column", "name": "growth",
                         "left": "revenues_2024", "operator": "sub", "right": "revenues_2023"},
                        {"op": "sort_by", "column": "growth", "descending": true},
                        {"op": "head", "n": 1}
                    ],
                    "output_variable": "growth"
                }),
                &mut ws,
            )
            .await
            .unwrap();

        let growth = ws.get("growth").unwrap();
        assert_eq!(growth.len(), 1);
        // citadel 增长 150 > millennium 20
        assert_eq!(growth.rows()[0][0], Cell::Str("cl_id_citadel".into()));
    }

    #[tokio::test]
    async fn test_missing_input_frame_is_not_found() {
        let mut ws = Workspace::new();
        let err = TransformTool
            .execute(
                json!({"input": "ghost", "ops": [], "output_variable": "out"}),
                &mut ws,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_bad_column_is_tool_execution_failure() {
        let mut ws = Workspace::new();
        ws.put("rev", revenue_frame(&[("cl_id_citadel", 1.0)]));
        let err = TransformTool
            .execute(
                json!({
                    "input": "rev",
                    "ops": [{"op": "sort_by", "column": "nope"}],
                    "output_variable": "out"
                }),
                &mut ws,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolExecution);
        // 失败的流水线不得写出结果
        assert!(ws.get("out").is_err());
    }

    #[tokio::test]
    async fn test_unknown_op_is_invalid_parameters() {
        let mut ws = Workspace::new();
        ws.put("rev", revenue_frame(&[("cl_id_citadel", 1.0)]));
        let err = TransformTool
            .execute(
                json!({
                    "input": "rev",
                    "ops": [{"op": "pivot", "column": "x"}],
                    "output_variable": "out"
                }),
                &mut ws,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
    }
}
