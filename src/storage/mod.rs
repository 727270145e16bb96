// ==========================================
// 航空器残值台账 - 存储层
// ==========================================
// 职责: 估值产物的内容寻址存储
// 说明: 外部存储服务以 ContentStore trait 接入，本地目录实现用于单机部署与测试
// ==========================================

pub mod content_store;

// 重导出核心类型
pub use content_store::{
    content_id_of, is_valid_content_id, ContentStore, LocalContentStore, StorageError,
    StorageResult,
};
