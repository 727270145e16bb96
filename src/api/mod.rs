// ==========================================
// 航空器残值台账 - API 层
// ==========================================
// 职责: 编排导入、引擎、存储与索引，向调用方提供业务接口
// ==========================================

pub mod error;
pub mod valuation_api;

// 重导出
pub use error::{ApiError, ApiResult};
pub use valuation_api::{
    AnchorReceipt, FetchedValuation, ProcessedLog, ValuationApi, PROCESSED_ARTIFACT_PREFIX,
};
