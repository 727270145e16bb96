// ==========================================
// 航空器残值台账 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================
// 配置键:
// - asset_params/{机型键}: 机型参数 JSON（覆写内置参数表）
// - major_check_markers: 大修检标记 JSON 字符串数组
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::valuation_config_trait::ValuationConfigReader;
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::params::{AssetTypeParameters, ModelParameterTable};
use crate::domain::types::AssetTypeKey;
use crate::engine::depreciation::{DepreciationEngine, DEFAULT_MAJOR_CHECK_MARKERS};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 配置键常量
pub mod config_keys {
    /// 机型参数覆写前缀
    pub const ASSET_PARAMS_PREFIX: &str = "asset_params/";

    /// 大修检标记
    pub const MAJOR_CHECK_MARKERS: &str = "major_check_markers";

    /// 机型参数配置键
    pub fn asset_params(key: crate::domain::types::AssetTypeKey) -> String {
        format!("{}{}", ASSET_PARAMS_PREFIX, key.as_str())
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> ConfigResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置
    pub fn list_config_values(&self) -> ConfigResult<HashMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }

    // ===== 机型参数 =====

    /// 覆写机型参数（校验后写入）
    pub fn set_asset_parameters(
        &self,
        key: AssetTypeKey,
        params: &AssetTypeParameters,
    ) -> ConfigResult<()> {
        let config_key = config_keys::asset_params(key);
        params
            .validate()
            .map_err(|source| ConfigError::InvalidParameters {
                key: config_key.clone(),
                source,
            })?;

        let json = serde_json::to_string(params).map_err(|source| ConfigError::InvalidJson {
            key: config_key.clone(),
            source,
        })?;
        self.set_config_value(&config_key, &json)
    }

    /// 加载机型参数表（内置表 + 覆写）
    pub fn load_parameter_table(&self) -> ConfigResult<ModelParameterTable> {
        let mut table = ModelParameterTable::builtin();

        for key in AssetTypeKey::ALL {
            let config_key = config_keys::asset_params(key);
            let raw = match self.get_config_value(&config_key)? {
                Some(v) => v,
                None => continue,
            };

            let params: AssetTypeParameters =
                serde_json::from_str(&raw).map_err(|source| ConfigError::InvalidJson {
                    key: config_key.clone(),
                    source,
                })?;
            table
                .set(key, params)
                .map_err(|source| ConfigError::InvalidParameters {
                    key: config_key.clone(),
                    source,
                })?;

            tracing::debug!(model = %key, "机型参数已由配置覆写");
        }

        Ok(table)
    }

    // ===== 大修检标记 =====

    /// 覆写大修检标记
    pub fn set_major_check_markers(&self, markers: &[String]) -> ConfigResult<()> {
        validate_markers(markers)?;
        let json = serde_json::to_string(markers).map_err(|source| ConfigError::InvalidJson {
            key: config_keys::MAJOR_CHECK_MARKERS.to_string(),
            source,
        })?;
        self.set_config_value(config_keys::MAJOR_CHECK_MARKERS, &json)
    }

    /// 读取大修检标记（未配置时返回默认值）
    pub fn load_major_check_markers(&self) -> ConfigResult<Vec<String>> {
        let raw = match self.get_config_value(config_keys::MAJOR_CHECK_MARKERS)? {
            Some(v) => v,
            None => return Ok(DEFAULT_MAJOR_CHECK_MARKERS.iter().map(|m| m.to_string()).collect()),
        };

        let markers: Vec<String> =
            serde_json::from_str(&raw).map_err(|source| ConfigError::InvalidJson {
                key: config_keys::MAJOR_CHECK_MARKERS.to_string(),
                source,
            })?;
        validate_markers(&markers)?;
        Ok(markers)
    }

    /// 按当前配置构造折旧引擎
    pub fn build_engine(&self) -> ConfigResult<DepreciationEngine> {
        Ok(DepreciationEngine::with_major_check_markers(
            self.load_major_check_markers()?,
        ))
    }
}

/// 标记列表不能为空，也不能包含空标记（空串会匹配所有工作类型）
fn validate_markers(markers: &[String]) -> ConfigResult<()> {
    if markers.is_empty() || markers.iter().any(|m| m.is_empty()) {
        return Err(ConfigError::InvalidValue {
            key: config_keys::MAJOR_CHECK_MARKERS.to_string(),
            message: "大修检标记列表不能为空且不能包含空字符串".to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl ValuationConfigReader for ConfigManager {
    async fn get_parameter_table(&self) -> ConfigResult<ModelParameterTable> {
        self.load_parameter_table()
    }

    async fn get_major_check_markers(&self) -> ConfigResult<Vec<String>> {
        self.load_major_check_markers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let manager = setup();
        assert_eq!(manager.load_parameter_table().unwrap(), ModelParameterTable::builtin());
        assert_eq!(
            manager.load_major_check_markers().unwrap(),
            vec!["B-Check", "C-Check", "D-Check"]
        );
    }

    #[test]
    fn test_asset_parameter_override() {
        let manager = setup();
        let custom = AssetTypeParameters::new(60_000_000.0, 500.0, 1000.0, 0.03).unwrap();
        manager.set_asset_parameters(AssetTypeKey::A320, &custom).unwrap();

        let table = manager.load_parameter_table().unwrap();
        assert_eq!(table.get(AssetTypeKey::A320), &custom);
        assert_eq!(
            table.get(AssetTypeKey::B787),
            ModelParameterTable::builtin().get(AssetTypeKey::B787)
        );
    }

    #[test]
    fn test_override_with_legacy_json_names() {
        let manager = setup();
        manager
            .set_config_value(
                "asset_params/B737 NG",
                r#"{"initialPrice": 1000, "permDepr": 1, "varDepr": 2, "annualEconRate": 0}"#,
            )
            .unwrap();

        let table = manager.load_parameter_table().unwrap();
        assert_eq!(table.get(AssetTypeKey::B737Ng).initial_price, 1000.0);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let manager = setup();
        manager
            .set_config_value(
                "asset_params/A330",
                r#"{"initial_price": -1, "permanent_depreciation_rate": 1, "variable_depreciation_rate": 1, "annual_economic_rate": 0}"#,
            )
            .unwrap();
        assert!(matches!(
            manager.load_parameter_table(),
            Err(ConfigError::InvalidParameters { .. })
        ));

        manager.set_config_value("asset_params/A330", "not json").unwrap();
        assert!(matches!(
            manager.load_parameter_table(),
            Err(ConfigError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_major_check_marker_override() {
        let manager = setup();
        manager
            .set_major_check_markers(&["HMV".to_string(), "C-Check".to_string()])
            .unwrap();

        let engine = manager.build_engine().unwrap();
        assert!(engine.is_major_check("HMV 2024"));
        assert!(!engine.is_major_check("D-Check"));

        assert!(manager.set_major_check_markers(&[]).is_err());
        assert!(manager.set_major_check_markers(&["".to_string()]).is_err());
    }

    #[test]
    fn test_list_config_values() {
        let manager = setup();
        manager.set_config_value("a", "1").unwrap();
        manager.set_config_value("a", "2").unwrap();
        let values = manager.list_config_values().unwrap();
        assert_eq!(values.get("a"), Some(&"2".to_string()));
    }
}
