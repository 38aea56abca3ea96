//! data_fetch 工具：取 revenues / balances / capital 数据写入 Workspace
//!
//! 解析实体与日期描述后调用 DataApi；维度组合校验在取数前完成：
//! revenues 不能按 country 过滤，capital 不能按 region 或 country 过滤。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::AgentError;
use crate::data::{Business, DataApi, FetchRequest, Granularity, Metric, Subbusiness};
use crate::resolve::{resolve_clients, resolve_dates};
use crate::tools::{parse_params, Tool};
use crate::workspace::Workspace;

/// data_fetch 参数；与 Planner prompt 中的 schema 一致
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DataFetchParams {
    pub metric: Metric,
    /// 客户名或分组名，如 ["millennium", "systematic", "all clients"]
    pub entities: Vec<String>,
    /// 自然语言时间段，如 "2023"、"Q1 2024"、"last year"
    pub date_description: String,
    pub granularity: Granularity,
    #[serde(default)]
    pub business: Option<Business>,
    #[serde(default)]
    pub subbusiness: Option<Subbusiness>,
    /// 区域过滤，如 ["EMEA", "AMERICAS"]
    #[serde(default)]
    pub region: Option<Vec<String>>,
    /// 国家过滤（仅 balances 指标支持）
    #[serde(default)]
    pub country: Option<Vec<String>>,
    /// 结果 frame 在 Workspace 中的名字
    pub output_variable: String,
}

impl DataFetchParams {
    /// 指标与维度的组合约束；违反时按 InvalidParameters 处理（确定性错误，不重试）
    fn validate(&self) -> Result<(), AgentError> {
        match self.metric {
            Metric::Revenues => {
                if self.country.is_some() {
                    return Err(AgentError::invalid_parameters(
                        "data_fetch",
                        "revenues cannot be filtered by country; use region instead",
                    ));
                }
                if self.granularity == Granularity::Country {
                    return Err(AgentError::invalid_parameters(
                        "data_fetch",
                        "revenues does not support country granularity",
                    ));
                }
            }
            Metric::Capital => {
                if self.region.is_some() || self.country.is_some() {
                    return Err(AgentError::invalid_parameters(
                        "data_fetch",
                        "capital cannot be filtered by region or country",
                    ));
                }
                if matches!(
                    self.granularity,
                    Granularity::Region | Granularity::Country
                ) {
                    return Err(AgentError::invalid_parameters(
                        "data_fetch",
                        "capital supports only aggregate/client/date/business/subbusiness granularity",
                    ));
                }
            }
            Metric::Balances => {}
        }
        if self.output_variable.trim().is_empty() {
            return Err(AgentError::invalid_parameters(
                "data_fetch",
                "output_variable must not be empty",
            ));
        }
        Ok(())
    }
}

/// data_fetch 工具：持有 DataApi；today 可注入，保证日期解析可测试
pub struct DataFetchTool {
    api: Arc<dyn DataApi>,
    today: NaiveDate,
}

impl DataFetchTool {
    pub fn new(api: Arc<dyn DataApi>) -> Self {
        Self {
            api,
            today: Local::now().date_naive(),
        }
    }

    pub fn with_today(api: Arc<dyn DataApi>, today: NaiveDate) -> Self {
        Self { api, today }
    }
}

#[async_trait]
impl Tool for DataFetchTool {
    fn name(&self) -> &str {
        "data_fetch"
    }

    fn description(&self) -> &str {
        "Fetch revenues, balances or capital data. Resolves entities and a natural \
         language date range, then writes the resulting frame to the workspace under \
         `output_variable`. revenues can be filtered by region but NOT by country; \
         capital supports neither region nor country."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schema_for!(DataFetchParams)).unwrap_or_default()
    }

    async fn execute(
        &self,
        params: Value,
        workspace: &mut Workspace,
    ) -> Result<String, AgentError> {
        let params: DataFetchParams = parse_params("data_fetch", params)?;
        params.validate()?;

        let client_ids = resolve_clients(&params.entities)?;
        let range = resolve_dates(&params.date_description, self.today)?;
        tracing::debug!(
            clients = client_ids.len(),
            start = %range.start,
            end = %range.end,
            "resolved fetch request"
        );

        let request = FetchRequest {
            metric: params.metric,
            client_ids,
            range,
            granularity: params.granularity,
            business: params.business,
            subbusiness: params.subbusiness,
            region: params.region,
            country: params.country,
        };
        let frame = self.api.fetch(&request).await?;
        let rows = frame.len();
        workspace.put(&params.output_variable, frame);
        Ok(format!(
            "Wrote frame '{}' ({} rows)",
            params.output_variable, rows
        ))
    }
}
