// ==========================================
// 航空器残值台账 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 布局: {home}/ledger.db + {home}/content/
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::api::ValuationApi;
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::record_index_repo::RecordIndexRepository;
use crate::storage::content_store::LocalContentStore;

/// 数据目录环境变量
pub const HOME_ENV_VAR: &str = "AIRCRAFT_RV_LEDGER_HOME";

/// 数据库文件名
pub const DB_FILE_NAME: &str = "ledger.db";

/// 内容存储子目录
pub const CONTENT_DIR_NAME: &str = "content";

/// 应用状态
///
/// 包含所有API实例和共享资源，数据库连接由配置层与索引仓储共享
pub struct AppState {
    /// 数据目录
    pub home_dir: PathBuf,

    /// 数据库路径
    pub db_path: String,

    /// 估值API
    pub valuation_api: Arc<ValuationApi>,

    /// 配置管理器（用于参数覆写命令）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - home_dir: 数据目录（不存在时自动创建）
    pub fn new<P: AsRef<Path>>(home_dir: P) -> Result<Self, String> {
        let home_dir = home_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&home_dir)
            .map_err(|e| format!("无法创建数据目录 {}: {}", home_dir.display(), e))?;

        let db_path = home_dir.join(DB_FILE_NAME).to_string_lossy().to_string();
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository / 存储层
        // ==========================================
        let record_index = Arc::new(RecordIndexRepository::from_connection(conn.clone()));

        let content_store = Arc::new(
            LocalContentStore::new(home_dir.join(CONTENT_DIR_NAME))
                .map_err(|e| format!("无法创建LocalContentStore: {}", e))?,
        );

        // 配置管理器
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let valuation_api = Arc::new(ValuationApi::new(
            config_manager.clone(),
            content_store,
            record_index,
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            home_dir,
            db_path,
            valuation_api,
            config_manager,
        })
    }
}

/// 获取默认数据目录
///
/// 优先级: 环境变量 AIRCRAFT_RV_LEDGER_HOME → 用户数据目录 → 当前目录
pub fn get_default_home_dir() -> PathBuf {
    // 允许通过环境变量显式指定数据目录（便于调试/测试/CI）
    if let Ok(path) = std::env::var(HOME_ENV_VAR) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("aircraft-rv-ledger"),
        None => PathBuf::from("./aircraft-rv-ledger"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_home_dir() {
        let path = get_default_home_dir();
        assert!(!path.as_os_str().is_empty());
    }

    #[test]
    fn test_app_state_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("ledger-home");
        let state = AppState::new(&home).unwrap();

        assert!(home.join(DB_FILE_NAME).exists());
        assert!(home.join(CONTENT_DIR_NAME).is_dir());
        assert!(state.db_path.ends_with(DB_FILE_NAME));
        assert_eq!(state.valuation_api.verify_index().unwrap(), 0);
    }
}
