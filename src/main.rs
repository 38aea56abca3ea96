//! Finch - 金融分析多步智能体
//!
//! 入口：初始化日志、加载配置、装配工具箱与控制器，对命令行查询执行一次运行，
//! 以表现层 JSON 输出结果。

use std::sync::Arc;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use finch::config::load_config;
use finch::core::Controller;
use finch::data::SyntheticDataApi;
use finch::llm::{LlmClient, MockLlmClient, OpenAiClient};
use finch::planner::LlmPlanner;
use finch::synthesizer::LlmSynthesizer;
use finch::tools::{
    DataFetchTool, DescribeFrameTool, InformUserTool, ListBusinessLinesTool, ToolDispatch,
    ToolRegistry, TransformTool,
};

/// 无 API Key 时的演示应答：单步 inform_user，绕过真实 LLM
const MOCK_PLAN: &str = r#"{"plan": [{"tool_name": "inform_user", "summary": "Explain demo mode.", "parameters": {"message": "Running without an OPENAI_API_KEY; set one to get real plans."}}]}"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    finch::observability::init();

    let cfg = load_config(None).context("Failed to load config")?;

    let query: String = {
        let args: Vec<String> = std::env::args().skip(1).collect();
        if args.is_empty() {
            "Show me the top 5 clients by revenue growth between 2023 and 2024".to_string()
        } else {
            args.join(" ")
        }
    };

    // 相对日期锚点：配置优先，否则系统当天
    let today: NaiveDate = match cfg.data.today.as_deref() {
        Some(s) => s
            .parse()
            .with_context(|| format!("Invalid data.today '{}'", s))?,
        None => Local::now().date_naive(),
    };

    let api: Arc<SyntheticDataApi> = Arc::new(SyntheticDataApi::new());
    let mut registry = ToolRegistry::new();
    registry.register(DataFetchTool::with_today(api, today));
    registry.register(DescribeFrameTool);
    registry.register(ListBusinessLinesTool);
    registry.register(TransformTool);
    registry.register(InformUserTool);
    let tools_schema = registry.to_schema_json();

    let api_key = std::env::var("OPENAI_API_KEY").ok();
    let llm: Arc<dyn LlmClient> = if cfg.llm.provider == "mock" || api_key.is_none() {
        tracing::warn!("no OPENAI_API_KEY set, using mock LLM");
        Arc::new(MockLlmClient::new(vec![MOCK_PLAN.to_string()]))
    } else {
        Arc::new(OpenAiClient::new(
            cfg.llm.base_url.as_deref(),
            &cfg.llm.model,
            api_key.as_deref(),
        ))
    };

    let planner = Arc::new(LlmPlanner::new(llm.clone(), &tools_schema));
    let synthesizer = Arc::new(LlmSynthesizer::new(llm));
    let controller = Controller::new(planner, synthesizer, ToolDispatch::new(registry));

    let report = controller.run(&query).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&report.outcome.to_presentation_json())
            .context("Failed to serialize outcome")?
    );

    Ok(())
}
