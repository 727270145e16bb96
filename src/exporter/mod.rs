// ==========================================
// 航空器残值台账 - 导出层
// ==========================================
// 职责: 估值产物的持久化文本格式
// ==========================================

pub mod valuation_csv;

// 重导出核心函数
pub use valuation_csv::{
    fleet_summary_text, from_delimited_text, to_delimited_text, VALUATION_HEADERS,
};
