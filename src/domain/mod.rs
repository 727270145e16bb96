// ==========================================
// 航空器残值台账 - 领域模型层
// ==========================================
// 职责: 定义机型参数、维修事件、估值记录
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod event;
pub mod params;
pub mod types;
pub mod valuation;

// 重导出核心类型
pub use event::{EventDate, MaintenanceEvent};
pub use params::{AssetTypeParameters, ModelParameterTable, ParameterError, REFERENCE_ANNUAL_TIS};
pub use types::AssetTypeKey;
pub use valuation::ValuationRecord;
