//! Workspace：单次运行内的具名表格工件存储
//!
//! 运行开始时为空，由成功的步骤逐步写入；同名 key 只能被显式重新赋值覆盖，
//! 不做任何隐式合并。运行结束后只读交给 Synthesizer，随运行一起丢弃。
//! 单写者：同一时刻只有 Controller 驱动的那一次工具调用在写。

use std::collections::BTreeMap;

use crate::core::AgentError;

pub mod frame;

pub use frame::{ArithOp, Cell, ColumnSchema, Dtype, Frame, FrameSchema};

/// 工件名 -> Frame。BTreeMap 保证 schema 快照的顺序确定。
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    frames: BTreeMap<String, Frame>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入或显式覆盖同名工件
    pub fn put(&mut self, name: &str, frame: Frame) {
        tracing::debug!(name, rows = frame.len(), "workspace put");
        self.frames.insert(name.to_string(), frame);
    }

    pub fn get(&self, name: &str) -> Result<&Frame, AgentError> {
        self.frames
            .get(name)
            .ok_or_else(|| AgentError::NotFound(name.to_string()))
    }

    /// 只取结构不取数据：列名与推断 dtype
    pub fn describe(&self, name: &str) -> Result<FrameSchema, AgentError> {
        Ok(self.get(name)?.schema())
    }

    /// 全部工件的 schema 快照（纠偏上下文用，不带数据）
    pub fn snapshot_schema(&self) -> BTreeMap<String, FrameSchema> {
        self.frames
            .iter()
            .map(|(name, frame)| (name.clone(), frame.schema()))
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.frames.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Frame)> {
        self.frames.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
