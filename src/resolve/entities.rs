//! 实体名解析：自然语言客户名 / 分组名 -> 内部客户 ID
//!
//! 先查分组（含 "all clients"），再精确匹配别名表，最后用 Jaro-Winkler 做容错匹配。
//! 任何一个实体都解析不出来时整体报错，让步骤失败并进入纠偏。

use std::collections::BTreeSet;

use crate::core::AgentError;
use crate::resolve::catalog::{all_client_ids, CLIENT_GROUPS, CLIENT_NAMES};

/// 模糊匹配的最低相似度（对应原阈值 80/100）
const FUZZY_THRESHOLD: f64 = 0.8;

/// 解析实体名列表为去重后的客户 ID 列表（排序保证确定性）
pub fn resolve_clients(entities: &[String]) -> Result<Vec<String>, AgentError> {
    if entities.is_empty() {
        return Err(AgentError::ToolExecutionFailed(
            "No entities given to resolve".to_string(),
        ));
    }

    let mut ids: BTreeSet<String> = BTreeSet::new();
    for entity in entities {
        let clean = entity.trim().to_lowercase();

        if clean == "all clients" || clean == "all" {
            ids.extend(all_client_ids());
            continue;
        }

        if let Some((_, members)) = CLIENT_GROUPS.iter().find(|(name, _)| *name == clean) {
            ids.extend(members.iter().map(|id| id.to_string()));
            continue;
        }

        if let Some((_, id)) = CLIENT_NAMES.iter().find(|(alias, _)| *alias == clean) {
            ids.insert(id.to_string());
            continue;
        }

        match fuzzy_match(&clean) {
            Some(id) => {
                tracing::debug!(entity = %entity, resolved = %id, "fuzzy entity match");
                ids.insert(id);
            }
            None => {
                return Err(AgentError::ToolExecutionFailed(format!(
                    "Could not resolve entity '{}' to a known client or group",
                    entity
                )))
            }
        }
    }
    Ok(ids.into_iter().collect())
}

fn fuzzy_match(clean: &str) -> Option<String> {
    let mut best: Option<(f64, &str)> = None;
    for &(alias, id) in CLIENT_NAMES {
        let score = strsim::jaro_winkler(clean, alias);
        if score >= FUZZY_THRESHOLD && best.map(|(s, _)| score > s).unwrap_or(true) {
            best = Some((score, id));
        }
    }
    best.map(|(_, id)| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_alias() {
        let ids = resolve_clients(&["Citadel".to_string()]).unwrap();
        assert_eq!(ids, vec!["cl_id_citadel"]);
    }

    #[test]
    fn test_group_expansion() {
        let ids = resolve_clients(&["systematic".to_string()]).unwrap();
        assert!(ids.contains(&"cl_id_twosigma".to_string()));
        assert!(ids.contains(&"cl_id_citadel".to_string()));
    }

    #[test]
    fn test_all_clients_expands_to_every_known_id() {
        let ids = resolve_clients(&["all clients".to_string()]).unwrap();
        assert_eq!(ids, all_client_ids());
    }

    #[test]
    fn test_fuzzy_typo() {
        // 轻微拼写错误仍应命中 millennium
        let ids = resolve_clients(&["millenium".to_string()]).unwrap();
        assert_eq!(ids, vec!["cl_id_millennium"]);
    }

    #[test]
    fn test_unresolvable_entity_fails() {
        let err = resolve_clients(&["acme corp".to_string()]).unwrap_err();
        assert!(err.to_string().contains("acme corp"));
    }

    #[test]
    fn test_deduplicates_across_entities() {
        let ids =
            resolve_clients(&["citadel".to_string(), "systematic".to_string()]).unwrap();
        let count = ids.iter().filter(|id| *id == "cl_id_citadel").count();
        assert_eq!(count, 1);
    }
}
