//! list_business_lines 工具：列出 data_fetch 可用的业务线取值

use async_trait::async_trait;
use serde_json::Value;

use crate::core::AgentError;
use crate::resolve::catalog::{VALID_BUSINESSES, VALID_SUBBUSINESSES};
use crate::tools::Tool;
use crate::workspace::Workspace;

pub struct ListBusinessLinesTool;

#[async_trait]
impl Tool for ListBusinessLinesTool {
    fn name(&self) -> &str {
        "list_business_lines"
    }

    fn description(&self) -> &str {
        "List the valid `business` and `subbusiness` values accepted by data_fetch. \
         Takes no parameters."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(
        &self,
        _params: Value,
        _workspace: &mut Workspace,
    ) -> Result<String, AgentError> {
        Ok(format!(
            "Valid businesses: [{}]. Valid subbusinesses: [{}].",
            VALID_BUSINESSES.join(", "),
            VALID_SUBBUSINESSES.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_lists_known_lines() {
        let mut ws = Workspace::new();
        let out = ListBusinessLinesTool
            .execute(json!(null), &mut ws)
            .await
            .unwrap();
        assert!(out.contains("Prime"));
        assert!(out.contains("SPG"));
    }
}
