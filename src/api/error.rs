// ==========================================
// 航空器残值台账 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把各层技术错误转换为可向用户描述的错误
// ==========================================

use crate::config::error::ConfigError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use crate::storage::content_store::StorageError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无写入权限: {0}")]
    Unauthorized(String),

    // ==========================================
    // 完整性错误
    // ==========================================
    #[error("完整性校验失败: {0}")]
    IntegrityViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("存储访问失败: {0}")]
    StorageError(String),

    // ==========================================
    // 导入 / 配置错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::Unauthorized { caller } => ApiError::Unauthorized(caller),
            RepositoryError::ChainBroken { record_id, reason } => ApiError::IntegrityViolation(
                format!("索引记录 {} 校验失败: {}", record_id, reason),
            ),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
        }
    }
}

// ==========================================
// 从 StorageError 转换
// ==========================================
impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(cid) => ApiError::NotFound(format!("内容 {} 不存在", cid)),
            StorageError::InvalidContentId(cid) => {
                ApiError::InvalidInput(format!("非法内容标识: {}", cid))
            }
            err @ StorageError::IntegrityMismatch { .. } => {
                ApiError::IntegrityViolation(err.to_string())
            }
            StorageError::Io(e) => ApiError::StorageError(e.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::ImportError(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_map_to_user_facing_kinds() {
        let err: ApiError = RepositoryError::NotFound {
            entity: "FileRecord".to_string(),
            id: "7".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg.contains("id=7")));

        let err: ApiError = RepositoryError::Unauthorized {
            caller: "0xabc".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::Unauthorized(ref c) if c == "0xabc"));

        let err: ApiError = RepositoryError::ChainBroken {
            record_id: 3,
            reason: "entry_hash 不一致".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::IntegrityViolation(_)));
    }

    #[test]
    fn test_lock_and_import_errors_keep_their_kind() {
        let err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(err, ApiError::DatabaseConnectionError(ref msg) if msg.contains("poisoned")));

        let err: ApiError = ImportError::UnsupportedFormat("pdf".to_string()).into();
        assert!(matches!(err, ApiError::ImportError(ref msg) if msg.contains("pdf")));
    }

    #[test]
    fn test_storage_integrity_mismatch_maps_to_integrity_violation() {
        let err: ApiError = StorageError::IntegrityMismatch {
            expected: "a".to_string(),
            actual: "b".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::IntegrityViolation(_)));
    }
}
