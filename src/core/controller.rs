//! 执行控制器：Planning -> Running -> {Correcting} -> Completed | Escalated
//!
//! 逐步驱动计划：成功则推进游标并清零重试计数；失败则按错误类别决定
//! 原样重试（瞬态）或进入纠偏（确定性错误或预算耗尽）。纠偏用 Planner 的
//! 续接计划替换游标起的全部剩余步骤，已执行前缀与其工件从不回滚。
//! Planner 表示无计可施时升级为 Escalated，短路 Synthesizer。

use std::sync::Arc;

use serde_json::json;

use crate::core::correction::{build_correction_context, splice_continuation};
use crate::plan::{ExecutionRecord, Step};
use crate::planner::Planner;
use crate::synthesizer::Synthesizer;
use crate::tools::{ToolDispatch, INFORM_USER_TOOL};
use crate::workspace::Workspace;

/// 每步最大重试次数：首次执行之外最多再试 2 次，共 3 次尝试
const MAX_RETRIES: u32 = 2;

/// 单次运行内最大纠偏次数，防止 Planner 与失败步骤互相兜圈子
const MAX_CORRECTIONS: u32 = 3;

/// 运行终态
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// 计划执行完毕；answer 来自 Synthesizer 或 inform_user 直达消息
    Completed {
        answer: String,
        reasoning_steps: Vec<String>,
    },
    /// 需要人工介入；结构化失败上下文，绝不抛裸错误
    Escalated {
        original_query: String,
        failed_step: String,
        error_message: String,
    },
}

impl RunOutcome {
    /// 表现层输出契约：status 只有 "ok" 与 "needs_human_input" 两种
    pub fn to_presentation_json(&self) -> serde_json::Value {
        match self {
            RunOutcome::Completed {
                answer,
                reasoning_steps,
            } => json!({
                "status": "ok",
                "answer": answer,
                "reasoning_steps": reasoning_steps,
            }),
            RunOutcome::Escalated {
                original_query,
                failed_step,
                error_message,
            } => json!({
                "status": "needs_human_input",
                "context": {
                    "original_query": original_query,
                    "failed_step": failed_step,
                    "error_message": error_message,
                }
            }),
        }
    }
}

/// 一次运行的完整结果：终态 + append-only 执行日志 + 最终 Workspace
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub records: Vec<ExecutionRecord>,
    pub workspace: Workspace,
}

/// 控制器：每次运行独占一个 Workspace；多路并发查询各建各的实例
pub struct Controller {
    planner: Arc<dyn Planner>,
    synthesizer: Arc<dyn Synthesizer>,
    dispatch: ToolDispatch,
}

impl Controller {
    pub fn new(
        planner: Arc<dyn Planner>,
        synthesizer: Arc<dyn Synthesizer>,
        dispatch: ToolDispatch,
    ) -> Self {
        Self {
            planner,
            synthesizer,
            dispatch,
        }
    }

    /// 执行一次完整运行；所有步骤级错误都收敛为终态，不向外抛
    pub async fn run(&self, query: &str) -> RunReport {
        let mut workspace = Workspace::new();
        let mut records: Vec<ExecutionRecord> = Vec::new();

        tracing::info!(query, "run start");
        let plan = match self.planner.create_plan(query).await {
            Ok(plan) => plan,
            Err(e) => {
                // 规划失败不重试：同样输入再问一遍不会有不同结果
                tracing::warn!(error = %e, "planning failed");
                return RunReport {
                    outcome: RunOutcome::Escalated {
                        original_query: query.to_string(),
                        failed_step: "(planning)".to_string(),
                        error_message: e.to_string(),
                    },
                    records,
                    workspace,
                };
            }
        };

        let mut steps: Vec<Step> = plan.into_steps();
        let mut cursor = 0usize;
        let mut retries = 0u32;
        let mut corrections = 0u32;
        let mut reasoning_steps: Vec<String> = Vec::new();
        let mut direct_message: Option<String> = None;

        while cursor < steps.len() {
            let step = steps[cursor].clone();
            tracing::info!(step = cursor + 1, total = steps.len(), tool = %step.tool_name, "executing step");

            let record = self.dispatch.invoke(&step, &mut workspace).await;
            match &record {
                ExecutionRecord::Success { output_summary, .. } => {
                    if step.tool_name == INFORM_USER_TOOL {
                        direct_message = Some(output_summary.clone());
                    }
                    reasoning_steps.push(format!("Step {}: {}", cursor + 1, step.summary));
                    records.push(record.clone());
                    cursor += 1;
                    retries = 0;
                }
                ExecutionRecord::Failure { kind, message, .. } => {
                    records.push(record.clone());
                    retries += 1;
                    // 确定性错误不消耗剩余预算，直接纠偏；瞬态错误用满预算再纠偏
                    let exhausted = !kind.is_retryable() || retries > MAX_RETRIES;
                    if !exhausted {
                        tracing::warn!(
                            tool = %step.tool_name,
                            attempt = retries + 1,
                            error = %message,
                            "step failed, retrying"
                        );
                        continue;
                    }

                    tracing::warn!(tool = %step.tool_name, error = %message, "retries exhausted, correcting");
                    corrections += 1;
                    if corrections > MAX_CORRECTIONS {
                        return self.escalate(
                            query,
                            &step.summary,
                            "Correction budget exhausted",
                            records,
                            workspace,
                        );
                    }

                    let context = build_correction_context(
                        query,
                        &step,
                        message,
                        workspace.snapshot_schema(),
                    );
                    match self.planner.correct_plan(&context).await {
                        Ok(Some(continuation)) => {
                            tracing::info!(
                                replaced = steps.len() - cursor,
                                new = continuation.len(),
                                "plan corrected"
                            );
                            splice_continuation(&mut steps, cursor, continuation);
                            retries = 0;
                        }
                        Ok(None) => {
                            return self.escalate(
                                query,
                                &step.summary,
                                message,
                                records,
                                workspace,
                            );
                        }
                        Err(e) => {
                            return self.escalate(
                                query,
                                &step.summary,
                                &e.to_string(),
                                records,
                                workspace,
                            );
                        }
                    }
                }
            }
        }

        // Completed：Workspace 与执行日志只读交给 Synthesizer；
        // inform_user 的直达消息优先，跳过合成
        let answer = match direct_message {
            Some(message) => Ok(message),
            None => {
                self.synthesizer
                    .respond(query, &workspace, &records)
                    .await
            }
        };
        match answer {
            Ok(answer) => {
                tracing::info!(steps = reasoning_steps.len(), "run completed");
                RunReport {
                    outcome: RunOutcome::Completed {
                        answer,
                        reasoning_steps,
                    },
                    records,
                    workspace,
                }
            }
            Err(e) => self.escalate(query, "(synthesis)", &e.to_string(), records, workspace),
        }
    }

    fn escalate(
        &self,
        query: &str,
        failed_step: &str,
        error_message: &str,
        records: Vec<ExecutionRecord>,
        workspace: Workspace,
    ) -> RunReport {
        tracing::warn!(failed_step, error = error_message, "run escalated");
        RunReport {
            outcome: RunOutcome::Escalated {
                original_query: query.to_string(),
                failed_step: failed_step.to_string(),
                error_message: error_message.to_string(),
            },
            records,
            workspace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presentation_json_ok_shape() {
        let outcome = RunOutcome::Completed {
            answer: "42".to_string(),
            reasoning_steps: vec!["Step 1: Fetch.".to_string()],
        };
        let v = outcome.to_presentation_json();
        assert_eq!(v["status"], "ok");
        assert_eq!(v["answer"], "42");
        assert_eq!(v["reasoning_steps"][0], "Step 1: Fetch.");
    }

    #[test]
    fn test_presentation_json_escalated_shape() {
        let outcome = RunOutcome::Escalated {
            original_query: "q".to_string(),
            failed_step: "Fetch.".to_string(),
            error_message: "boom".to_string(),
        };
        let v = outcome.to_presentation_json();
        assert_eq!(v["status"], "needs_human_input");
        assert_eq!(v["context"]["failed_step"], "Fetch.");
        assert_eq!(v["context"]["error_message"], "boom");
    }
}
