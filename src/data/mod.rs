//! 数据 API 协作方：取数契约与内存合成后端
//!
//! Controller 核心只依赖 DataApi trait；真实上游（内部数据平台）与
//! 本地合成后端都在这条缝后面。

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::resolve::DateRange;
use crate::workspace::Frame;

pub mod synthetic;

pub use synthetic::SyntheticDataApi;

/// 可取的指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Revenues,
    Balances,
    Capital,
}

impl Metric {
    pub fn column_name(&self) -> &'static str {
        match self {
            Metric::Revenues => "revenues",
            Metric::Balances => "balances",
            Metric::Capital => "capital",
        }
    }
}

/// 聚合粒度：aggregate 出单行总数，其余按对应维度分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Aggregate,
    Client,
    Date,
    Business,
    Subbusiness,
    Region,
    Country,
}

/// 业务线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Business {
    Prime,
    #[serde(rename = "Equities Ex Prime")]
    EquitiesExPrime,
    #[serde(rename = "FICC")]
    Ficc,
}

/// 子业务线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Subbusiness {
    #[serde(rename = "PB")]
    Pb,
    #[serde(rename = "SPG")]
    Spg,
    Futures,
    #[serde(rename = "DCS")]
    Dcs,
    #[serde(rename = "One Delta")]
    OneDelta,
    #[serde(rename = "Eq Deriv")]
    EqDeriv,
    Credit,
    Macro,
}

/// 取数请求：实体与日期已由上游解析为规范标识
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub metric: Metric,
    pub client_ids: Vec<String>,
    pub range: DateRange,
    pub granularity: Granularity,
    pub business: Option<Business>,
    pub subbusiness: Option<Subbusiness>,
    pub region: Option<Vec<String>>,
    pub country: Option<Vec<String>>,
}

/// 取数契约：返回一个 Frame；调用方负责写入 Workspace
#[async_trait]
pub trait DataApi: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Frame, AgentError>;
}
