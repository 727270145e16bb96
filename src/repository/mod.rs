// ==========================================
// 航空器残值台账 - 数据仓储层
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod record_index_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use record_index_repo::{
    compute_entry_hash, normalize_address, FileRecordEntity, RecordIndexRepository, GENESIS_HASH,
    NOT_FOUND_SENTINEL,
};
