// ==========================================
// 航空器残值台账 - 应用层
// ==========================================
// 职责: 组装数据库、存储、配置与API实例
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_home_dir, AppState, HOME_ENV_VAR};
