//! 脚本化 Planner（测试与离线演示用）
//!
//! 预置初始计划与纠偏续接队列；记录收到的每个纠偏上下文，供测试断言。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::{AgentError, CorrectionContext};
use crate::plan::Plan;
use crate::planner::Planner;

/// 脚本化 Planner：按队列回放
#[derive(Default)]
pub struct ScriptedPlanner {
    initial: Mutex<Option<Plan>>,
    continuations: Mutex<VecDeque<Option<Plan>>>,
    corrections_seen: Mutex<Vec<CorrectionContext>>,
}

impl ScriptedPlanner {
    pub fn new(initial: Plan) -> Self {
        Self {
            initial: Mutex::new(Some(initial)),
            ..Default::default()
        }
    }

    /// 追加一次纠偏应答；None 表示「没有可行的续接」
    pub fn push_continuation(&self, continuation: Option<Plan>) {
        self.continuations
            .lock()
            .expect("scripted lock")
            .push_back(continuation);
    }

    /// 收到过的纠偏上下文（按序）
    pub fn corrections_seen(&self) -> Vec<CorrectionContext> {
        self.corrections_seen.lock().expect("scripted lock").clone()
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn create_plan(&self, _query: &str) -> Result<Plan, AgentError> {
        self.initial
            .lock()
            .expect("scripted lock")
            .take()
            .ok_or_else(|| AgentError::Planning("No scripted plan".to_string()))
    }

    async fn correct_plan(
        &self,
        context: &CorrectionContext,
    ) -> Result<Option<Plan>, AgentError> {
        self.corrections_seen
            .lock()
            .expect("scripted lock")
            .push(context.clone());
        match self
            .continuations
            .lock()
            .expect("scripted lock")
            .pop_front()
        {
            Some(c) => Ok(c),
            // 队列耗尽等同于无计可施
            None => Ok(None),
        }
    }
}
