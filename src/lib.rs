// ==========================================
// 航空器残值台账 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + 本地内容寻址存储
// 系统定位: 维修履历 → 残值/储备金估值 → 产物存证与回取
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 机型参数、维修事件、估值记录
pub mod domain;

// 引擎层 - 机型识别与折旧计算
pub mod engine;

// 导入层 - 履历文件读取与解析
pub mod importer;

// 导出层 - 估值产物序列化
pub mod exporter;

// 存储层 - 内容寻址存储
pub mod storage;

// 数据仓储层 - 存证索引
pub mod repository;

// 配置层 - 参数覆写
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AssetTypeKey, AssetTypeParameters, EventDate, MaintenanceEvent, ModelParameterTable,
    ValuationRecord,
};

// 引擎
pub use engine::{detect_model, DepreciationEngine, ModelDetector};

// 导入 / 导出
pub use exporter::{from_delimited_text, to_delimited_text};
pub use importer::{parse_events, parse_maintenance_log, ParseWarning};

// API
pub use api::{ApiError, ApiResult, ValuationApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "航空器残值台账";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
