//! 客户与业务线知识表
//!
//! 别名 -> 内部 ID 的静态映射；分组名展开为成员 ID 列表。"all clients" 动态展开为全部已知客户。

/// (别名, 客户 ID)
pub const CLIENT_NAMES: &[(&str, &str)] = &[
    ("millennium", "cl_id_millennium"),
    ("citadel", "cl_id_citadel"),
    ("point 72", "cl_id_point72"),
    ("point72", "cl_id_point72"),
    ("two sigma", "cl_id_twosigma"),
    ("balyasny", "cl_id_balyasny"),
    ("marshall wace", "cl_id_marshallwace"),
];

/// (分组名, 成员客户 ID)
pub const CLIENT_GROUPS: &[(&str, &[&str])] = &[
    (
        "systematic",
        &["cl_id_twosigma", "cl_id_citadel", "cl_id_marshallwace"],
    ),
    ("quant", &["cl_id_twosigma", "cl_id_marshallwace"]),
    (
        "multi-manager",
        &["cl_id_millennium", "cl_id_point72", "cl_id_balyasny"],
    ),
];

pub const VALID_BUSINESSES: &[&str] = &["Prime", "Equities Ex Prime", "FICC"];

pub const VALID_SUBBUSINESSES: &[&str] = &[
    "PB", "SPG", "Futures", "DCS", "One Delta", "Eq Deriv", "Credit", "Macro",
];

pub const VALID_REGIONS: &[&str] = &["AMERICAS", "EMEA", "ASIA", "NA"];

/// 全部已知客户 ID（去重后），"all clients" 即展开为此列表
pub fn all_client_ids() -> Vec<String> {
    let mut ids: Vec<String> = CLIENT_NAMES.iter().map(|(_, id)| id.to_string()).collect();
    ids.sort();
    ids.dedup();
    ids
}

/// 客户 ID -> 展示名（Synthesizer 与合成数据后端用）
pub fn display_name(client_id: &str) -> String {
    for (alias, id) in CLIENT_NAMES {
        if *id == client_id {
            // 别名表按「首个别名即正名」排列
            let mut name = String::new();
            for word in alias.split_whitespace() {
                let mut chars = word.chars();
                if let Some(first) = chars.next() {
                    name.push_str(&first.to_uppercase().to_string());
                    name.push_str(chars.as_str());
                }
                name.push(' ');
            }
            return name.trim_end().to_string();
        }
    }
    client_id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_client_ids_deduplicated() {
        let ids = all_client_ids();
        // point 72 / point72 两个别名指向同一 ID
        let count = ids.iter().filter(|id| *id == "cl_id_point72").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("cl_id_twosigma"), "Two Sigma");
        assert_eq!(display_name("cl_id_unknown"), "cl_id_unknown");
    }
}
