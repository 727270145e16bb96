// ==========================================
// 航空器残值台账 - 内容寻址存储
// ==========================================
// 职责: 估值产物的上传 / 回取
// 标识: 内容标识 = 产物字节的 SHA-256 十六进制摘要
// 校验: 回取时复算摘要，不一致视为篡改
// ==========================================

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 存储层错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("内容不存在: {0}")]
    NotFound(String),

    #[error("非法内容标识: {0}")]
    InvalidContentId(String),

    #[error("内容完整性校验失败: 期望 {expected}，实际 {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("存储读写失败: {0}")]
    Io(#[from] std::io::Error),
}

/// Result 类型别名
pub type StorageResult<T> = Result<T, StorageError>;

/// 计算内容标识
pub fn content_id_of(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// 内容标识格式校验（64 位小写十六进制）
pub fn is_valid_content_id(content_id: &str) -> bool {
    content_id.len() == 64
        && content_id
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

// ==========================================
// ContentStore - 内容寻址存储接口
// ==========================================
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// 存入内容，返回内容标识（相同内容得到相同标识）
    async fn put(&self, name: &str, bytes: &[u8]) -> StorageResult<String>;

    /// 按内容标识取回内容
    async fn get(&self, content_id: &str) -> StorageResult<Vec<u8>>;
}

// ==========================================
// LocalContentStore - 本地目录实现
// ==========================================
pub struct LocalContentStore {
    root: PathBuf,
}

impl LocalContentStore {
    /// 创建本地存储（目录不存在时自动创建）
    pub fn new<P: AsRef<Path>>(root: P) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, content_id: &str) -> StorageResult<PathBuf> {
        if !is_valid_content_id(content_id) {
            return Err(StorageError::InvalidContentId(content_id.to_string()));
        }
        Ok(self.root.join(content_id))
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> StorageResult<String> {
        let content_id = content_id_of(bytes);
        let path = self.path_for(&content_id)?;

        if tokio::fs::try_exists(&path).await? {
            tracing::debug!(%content_id, name, "内容已存在，跳过写入");
            return Ok(content_id);
        }

        // 先写临时文件再重命名，避免半写入文件占用内容标识
        let tmp_path = self.root.join(format!("{}.tmp-{}", content_id, uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp_path, bytes).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        tracing::info!(%content_id, name, size = bytes.len(), "内容已存储");
        Ok(content_id)
    }

    async fn get(&self, content_id: &str) -> StorageResult<Vec<u8>> {
        let path = self.path_for(content_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(content_id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let actual = content_id_of(&bytes);
        if actual != content_id {
            tracing::error!(expected = content_id, %actual, "内容完整性校验失败");
            return Err(StorageError::IntegrityMismatch {
                expected: content_id.to_string(),
                actual,
            });
        }

        Ok(bytes)
    }
}
