// ==========================================
// 航空器残值台账 - 配置层
// ==========================================
// 职责: 机型参数覆写、大修检标记配置
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod error;
pub mod valuation_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use valuation_config_trait::ValuationConfigReader;
