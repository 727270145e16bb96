// ==========================================
// 航空器残值台账 - 维修事件
// ==========================================
// 职责: 维修履历中的单行事件 (MaintenanceEvent)
// 约束: 事件按文件顺序消费，不按日期重排
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 支持的日期格式（按顺序尝试）
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%Y.%m.%d", "%m/%d/%Y"];

// ==========================================
// EventDate - 事件日期
// ==========================================
/// 保留原始文本；能解析时附带日历日期，无法解析时作为不透明字符串保留
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDate {
    raw: String,
    calendar: Option<NaiveDate>,
}

impl EventDate {
    /// 解析日期文本（不会失败）
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self {
            raw: trimmed.to_string(),
            calendar: parse_calendar_date(trimmed),
        }
    }

    /// 空日期
    pub fn blank() -> Self {
        Self {
            raw: String::new(),
            calendar: None,
        }
    }

    /// 原始文本
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// 日历日期（无法解析时为 None）
    pub fn calendar(&self) -> Option<NaiveDate> {
        self.calendar
    }

    pub fn is_blank(&self) -> bool {
        self.raw.is_empty()
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    // ISO 8601 日期时间（2024-03-01T08:00:00Z / 2024-03-01 08:00:00）取日期部分
    match (value.get(..10), value.as_bytes().get(10)) {
        (Some(prefix), Some(b'T' | b' ')) => NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok(),
        _ => None,
    }
}

// ==========================================
// MaintenanceEvent - 维修事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceEvent {
    /// 事件日期
    pub date: EventDate,

    /// 累计在役时间（TIS），正常履历中单调不减
    pub time_in_service: f64,

    /// 工作类型（可能包含大修检标记，如 "C-Check"）
    pub work_type: String,

    /// 源文件行号（表头为第 1 行）
    pub row_number: usize,
}

impl MaintenanceEvent {
    pub fn new(date: EventDate, time_in_service: f64, work_type: impl Into<String>) -> Self {
        Self {
            date,
            time_in_service,
            work_type: work_type.into(),
            row_number: 0,
        }
    }

    pub fn with_row_number(mut self, row_number: usize) -> Self {
        self.row_number = row_number;
        self
    }
}
