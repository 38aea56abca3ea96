//! 日期描述解析：自然语言时间段 -> 闭区间 [start, end]
//!
//! 按优先级依次尝试：显式区间、财年（fy'24，10 月起始）、季度（q1 2025）、
//! 年份（2023）、相对词（last/this/past year、since ...）。全部失败则报错，
//! 让步骤失败并进入纠偏，而不是悄悄落回默认区间。

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::AgentError;

/// 闭区间日期范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    fn year(year: i32) -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1).expect("valid year start"),
            end: NaiveDate::from_ymd_opt(year, 12, 31).expect("valid year end"),
        }
    }
}

/// 解析日期描述；`today` 由调用方传入，保证可测试
pub fn resolve_dates(description: &str, today: NaiveDate) -> Result<DateRange, AgentError> {
    let clean = description.trim().to_lowercase();
    if clean.is_empty() {
        return Err(AgentError::ToolExecutionFailed(
            "Empty date description".to_string(),
        ));
    }

    // 显式区间："2023-01-01 to 2023-06-30"
    let range_re = Regex::new(r"(\d{4}-\d{2}-\d{2})\s+to\s+(\d{4}-\d{2}-\d{2})")
        .expect("valid regex");
    if let Some(caps) = range_re.captures(&clean) {
        let start = parse_iso(&caps[1])?;
        let end = parse_iso(&caps[2])?;
        if end < start {
            return Err(AgentError::ToolExecutionFailed(format!(
                "Date range '{}' ends before it starts",
                description
            )));
        }
        return Ok(DateRange::new(start, end));
    }

    // 财年："fy'24" / "fy2024"，10 月起始
    let fy_re = Regex::new(r"fy\s?'?(\d{2,4})").expect("valid regex");
    if let Some(caps) = fy_re.captures(&clean) {
        let year = expand_year(&caps[1]);
        return Ok(DateRange::new(
            NaiveDate::from_ymd_opt(year - 1, 10, 1).expect("valid fiscal start"),
            NaiveDate::from_ymd_opt(year, 9, 30).expect("valid fiscal end"),
        ));
    }

    // 季度："q1 2025" / "qtr 1 2025" / "q1'25"
    let q_re = Regex::new(r"(?:q|qtr)\s?([1-4])\s?'?(\d{2,4})").expect("valid regex");
    if let Some(caps) = q_re.captures(&clean) {
        let quarter: u32 = caps[1].parse().expect("single digit");
        let year = expand_year(&caps[2]);
        let start_month = (quarter - 1) * 3 + 1;
        let start = NaiveDate::from_ymd_opt(year, start_month, 1).expect("valid quarter start");
        let end = last_day_of_month(year, start_month + 2);
        return Ok(DateRange::new(start, end));
    }

    // 相对词（在裸年份之前匹配，"since 2023" 含年份但语义不同）
    if clean.contains("last year") {
        return Ok(DateRange::year(today.year() - 1));
    }
    if clean.contains("this year") || clean.contains("ytd") {
        return Ok(DateRange::new(
            NaiveDate::from_ymd_opt(today.year(), 1, 1).expect("valid year start"),
            today,
        ));
    }
    if clean.contains("past year") {
        return Ok(DateRange::new(today - Duration::days(365), today));
    }
    let since_re = Regex::new(r"since\s+(\d{4})(?:-(\d{2})-(\d{2}))?").expect("valid regex");
    if let Some(caps) = since_re.captures(&clean) {
        let year: i32 = caps[1].parse().expect("four digits");
        let start = match (caps.get(2), caps.get(3)) {
            (Some(m), Some(d)) => NaiveDate::from_ymd_opt(
                year,
                m.as_str().parse().expect("two digits"),
                d.as_str().parse().expect("two digits"),
            )
            .ok_or_else(|| {
                AgentError::ToolExecutionFailed(format!("Invalid date in '{}'", description))
            })?,
            _ => NaiveDate::from_ymd_opt(year, 1, 1).expect("valid year start"),
        };
        return Ok(DateRange::new(start, today));
    }

    // 裸年份："2023"
    let year_re = Regex::new(r"\b(20\d{2})\b").expect("valid regex");
    if let Some(caps) = year_re.captures(&clean) {
        let year: i32 = caps[1].parse().expect("four digits");
        return Ok(DateRange::year(year));
    }

    Err(AgentError::ToolExecutionFailed(format!(
        "Could not resolve date description '{}'",
        description
    )))
}

fn parse_iso(s: &str) -> Result<NaiveDate, AgentError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| AgentError::ToolExecutionFailed(format!("Invalid date '{}': {}", s, e)))
}

fn expand_year(s: &str) -> i32 {
    let n: i32 = s.parse().expect("digits");
    if n < 100 {
        2000 + n
    } else {
        n
    }
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_y, next_m) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_y, next_m, 1).expect("valid month start") - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_bare_year() {
        let r = resolve_dates("2023", today()).unwrap();
        assert_eq!(r, DateRange::new(d(2023, 1, 1), d(2023, 12, 31)));
    }

    #[test]
    fn test_quarter() {
        let r = resolve_dates("Q1 2025", today()).unwrap();
        assert_eq!(r, DateRange::new(d(2025, 1, 1), d(2025, 3, 31)));
        let r = resolve_dates("q4'24", today()).unwrap();
        assert_eq!(r, DateRange::new(d(2024, 10, 1), d(2024, 12, 31)));
    }

    #[test]
    fn test_fiscal_year_starts_in_october() {
        let r = resolve_dates("fy'24", today()).unwrap();
        assert_eq!(r, DateRange::new(d(2023, 10, 1), d(2024, 9, 30)));
    }

    #[test]
    fn test_relative_terms() {
        assert_eq!(
            resolve_dates("last year", today()).unwrap(),
            DateRange::new(d(2024, 1, 1), d(2024, 12, 31))
        );
        assert_eq!(
            resolve_dates("this year", today()).unwrap(),
            DateRange::new(d(2025, 1, 1), today())
        );
        let past = resolve_dates("past year", today()).unwrap();
        assert_eq!(past.end, today());
        assert_eq!(past.start, today() - Duration::days(365));
    }

    #[test]
    fn test_since_year() {
        let r = resolve_dates("since 2023", today()).unwrap();
        assert_eq!(r, DateRange::new(d(2023, 1, 1), today()));
    }

    #[test]
    fn test_explicit_range() {
        let r = resolve_dates("2023-01-01 to 2023-06-30", today()).unwrap();
        assert_eq!(r, DateRange::new(d(2023, 1, 1), d(2023, 6, 30)));
    }

    #[test]
    fn test_reversed_range_fails() {
        assert!(resolve_dates("2023-06-30 to 2023-01-01", today()).is_err());
    }

    #[test]
    fn test_unparseable_description_fails() {
        let err = resolve_dates("whenever you like", today()).unwrap_err();
        assert!(err.to_string().contains("whenever"));
    }
}
