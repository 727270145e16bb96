// ==========================================
// 航空器残值台账 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::params::ParameterError;
use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置读取失败: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("配置锁获取失败: {0}")]
    LockError(String),

    #[error("配置值格式错误 (key: {key}): {source}")]
    InvalidJson {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("机型参数无效 (key: {key}): {source}")]
    InvalidParameters {
        key: String,
        #[source]
        source: ParameterError,
    },

    #[error("配置值无效 (key: {key}): {message}")]
    InvalidValue { key: String, message: String },
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
