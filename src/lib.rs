//! Finch - 金融分析多步智能体
//!
//! 把分析型查询分解为工具调用计划，在共享 Workspace 上逐步执行，
//! 失败时按错误类别重试或向 Planner 请求纠偏续接。
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、执行控制器、纠偏协议
//! - **data**: 数据访问抽象与合成后端
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **plan**: 计划、步骤与执行日志
//! - **planner**: 查询 -> 计划，纠偏上下文 -> 续接计划
//! - **resolve**: 实体与日期的规范化
//! - **synthesizer**: 完成的 Workspace -> 自然语言回答
//! - **tools**: 工具箱（data_fetch、describe_frame、transform 等）与分发器
//! - **workspace**: 表格工件的可变命名空间

pub mod config;
pub mod core;
pub mod data;
pub mod llm;
pub mod observability;
pub mod plan;
pub mod planner;
pub mod resolve;
pub mod synthesizer;
pub mod tools;
pub mod workspace;
