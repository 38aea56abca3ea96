//! 内存合成数据后端
//!
//! 模拟服务端取数 + 聚合：值由 (client_id, metric, 维度) 哈希派生，
//! 同样的请求永远返回同样的数据，测试与演示可复现。

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate};

use crate::core::AgentError;
use crate::data::{DataApi, FetchRequest, Granularity, Metric};
use crate::resolve::catalog::{display_name, VALID_BUSINESSES, VALID_REGIONS, VALID_SUBBUSINESSES};
use crate::workspace::{Cell, Frame};

/// 合成后端：无状态，无外部依赖
#[derive(Debug, Default)]
pub struct SyntheticDataApi;

impl SyntheticDataApi {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DataApi for SyntheticDataApi {
    async fn fetch(&self, request: &FetchRequest) -> Result<Frame, AgentError> {
        if request.client_ids.is_empty() {
            return Err(AgentError::ToolExecutionFailed(
                "No client ids in fetch request".to_string(),
            ));
        }
        let frame = match request.granularity {
            Granularity::Aggregate => aggregate_frame(request),
            Granularity::Client => client_frame(request),
            Granularity::Date => date_frame(request),
            Granularity::Business => dimension_frame(request, "business", VALID_BUSINESSES),
            Granularity::Subbusiness => {
                dimension_frame(request, "subbusiness", VALID_SUBBUSINESSES)
            }
            Granularity::Region => dimension_frame(request, "region", VALID_REGIONS),
            Granularity::Country => {
                dimension_frame(request, "country", &["USA", "GBR", "JPN", "DEU", "HKG"])
            }
        }?;
        Ok(frame)
    }
}

fn aggregate_frame(request: &FetchRequest) -> Result<Frame, AgentError> {
    let total: f64 = request
        .client_ids
        .iter()
        .map(|id| client_value(id, request))
        .sum();
    let mut frame = Frame::new(vec![request.metric.column_name().to_string()]);
    frame.push_row(vec![Cell::Float(round2(total))])?;
    Ok(frame)
}

fn client_frame(request: &FetchRequest) -> Result<Frame, AgentError> {
    let mut frame = Frame::new(vec![
        "client_id".to_string(),
        "client_name".to_string(),
        request.metric.column_name().to_string(),
    ]);
    for id in &request.client_ids {
        frame.push_row(vec![
            Cell::Str(id.clone()),
            Cell::Str(display_name(id)),
            Cell::Float(round2(client_value(id, request))),
        ])?;
    }
    Ok(frame)
}

fn date_frame(request: &FetchRequest) -> Result<Frame, AgentError> {
    let mut frame = Frame::new(vec![
        "date".to_string(),
        request.metric.column_name().to_string(),
    ]);
    let mut day = request.range.start;
    while day <= request.range.end {
        let daily: f64 = request
            .client_ids
            .iter()
            .map(|id| daily_value(id, request.metric, day))
            .sum();
        frame.push_row(vec![Cell::Date(day), Cell::Float(round2(daily))])?;
        day += Duration::days(1);
    }
    Ok(frame)
}

fn dimension_frame(
    request: &FetchRequest,
    dimension: &str,
    values: &[&str],
) -> Result<Frame, AgentError> {
    let mut frame = Frame::new(vec![
        dimension.to_string(),
        request.metric.column_name().to_string(),
    ]);
    for value in values {
        let total: f64 = request
            .client_ids
            .iter()
            .map(|id| hashed_value(&format!("{}|{}|{:?}", id, value, request.metric)))
            .sum();
        frame.push_row(vec![Cell::Str(value.to_string()), Cell::Float(round2(total))])?;
    }
    Ok(frame)
}

/// 单客户在整个区间上的值：按天累加，区间不同结果就不同
fn client_value(client_id: &str, request: &FetchRequest) -> f64 {
    let mut day = request.range.start;
    let mut total = 0.0;
    while day <= request.range.end {
        total += daily_value(client_id, request.metric, day);
        day += Duration::days(1);
    }
    total
}

fn daily_value(client_id: &str, metric: Metric, day: NaiveDate) -> f64 {
    let seed = format!("{}|{:?}|{}", client_id, metric, day.num_days_from_ce());
    let base = hashed_value(&seed);
    match metric {
        Metric::Revenues => base,
        // balances / capital 的量级远大于日收入
        Metric::Balances => base * 100.0,
        Metric::Capital => base * 40.0,
    }
}

/// FNV-1a 派生的 [1000, 50000) 区间值
fn hashed_value(seed: &str) -> f64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in seed.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    1000.0 + (hash % 49000) as f64
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::DateRange;

    fn request(metric: Metric, granularity: Granularity) -> FetchRequest {
        FetchRequest {
            metric,
            client_ids: vec!["cl_id_citadel".into(), "cl_id_millennium".into()],
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
            ),
            granularity,
            business: None,
            subbusiness: None,
            region: None,
            country: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_is_deterministic() {
        let api = SyntheticDataApi::new();
        let req = request(Metric::Revenues, Granularity::Client);
        let a = api.fetch(&req).await.unwrap();
        let b = api.fetch(&req).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_client_granularity_shape() {
        let api = SyntheticDataApi::new();
        let frame = api
            .fetch(&request(Metric::Revenues, Granularity::Client))
            .await
            .unwrap();
        assert_eq!(frame.columns(), &["client_id", "client_name", "revenues"]);
        assert_eq!(frame.len(), 2);
    }

    #[tokio::test]
    async fn test_date_granularity_one_row_per_day() {
        let api = SyntheticDataApi::new();
        let frame = api
            .fetch(&request(Metric::Balances, Granularity::Date))
            .await
            .unwrap();
        assert_eq!(frame.columns(), &["date", "balances"]);
        assert_eq!(frame.len(), 31);
    }

    #[tokio::test]
    async fn test_aggregate_granularity_single_row() {
        let api = SyntheticDataApi::new();
        let frame = api
            .fetch(&request(Metric::Capital, Granularity::Aggregate))
            .await
            .unwrap();
        assert_eq!(frame.columns(), &["capital"]);
        assert_eq!(frame.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_client_list_fails() {
        let api = SyntheticDataApi::new();
        let mut req = request(Metric::Revenues, Granularity::Aggregate);
        req.client_ids.clear();
        assert!(api.fetch(&req).await.is_err());
    }
}
