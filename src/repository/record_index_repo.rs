// ==========================================
// 航空器残值台账 - 存证索引仓储
// ==========================================
// 职责: 记录 ID → 内容标识 的只追加映射
// 规则:
// - 记录 ID 从 0 开始连续编号，每个 ID 至多写入一次
// - 仅管理员地址可追加
// - 查询不存在的 ID 返回空字符串哨兵；require_content_id 将哨兵视为 NotFound
// - 每行保存 prev_hash / entry_hash，构成可校验的哈希链
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex};

/// 哈希链起点
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// 未找到记录时的哨兵值
pub const NOT_FOUND_SENTINEL: &str = "";

/// 存证索引行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecordEntity {
    pub record_id: i64,
    pub content_id: String,
    pub recorded_by: String,
    pub run_id: String,
    pub prev_hash: String,
    pub entry_hash: String,
    pub recorded_at: String,
}

/// 地址统一小写去空白
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// 计算索引行哈希
pub fn compute_entry_hash(
    prev_hash: &str,
    record_id: i64,
    content_id: &str,
    recorded_by: &str,
    run_id: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prev_hash.as_bytes());
    hasher.update(b"|");
    hasher.update(record_id.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(content_id.as_bytes());
    hasher.update(b"|");
    hasher.update(recorded_by.as_bytes());
    hasher.update(b"|");
    hasher.update(run_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ==========================================
// RecordIndexRepository - 存证索引仓储
// ==========================================
pub struct RecordIndexRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RecordIndexRepository {
    /// 创建新的 RecordIndexRepository 实例（自动建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例（调用方负责建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 管理员
    // ==========================================

    /// 授予管理员权限（幂等）
    pub fn grant_admin(&self, address: &str) -> RepositoryResult<()> {
        let address = normalize_address(address);
        if address.is_empty() {
            return Err(RepositoryError::ValidationError("管理员地址不能为空".to_string()));
        }

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO ledger_admin (address) VALUES (?1)",
            params![address],
        )?;
        tracing::info!(%address, "已授予管理员权限");
        Ok(())
    }

    /// 是否为管理员
    pub fn is_admin(&self, address: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM ledger_admin WHERE address = ?1",
                params![normalize_address(address)],
                |_row| Ok(true),
            )
            .optional()?;
        Ok(found.unwrap_or(false))
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 追加内容标识，返回新分配的记录 ID
    ///
    /// # 错误
    /// - Unauthorized: 调用方不是管理员
    /// - ValidationError: 内容标识为空（与未找到哨兵冲突）
    pub fn append(&self, caller: &str, content_id: &str, run_id: &str) -> RepositoryResult<i64> {
        if !self.is_admin(caller)? {
            return Err(RepositoryError::Unauthorized {
                caller: caller.to_string(),
            });
        }

        let content_id = content_id.trim();
        if content_id.is_empty() {
            return Err(RepositoryError::ValidationError("内容标识不能为空".to_string()));
        }

        let recorded_by = normalize_address(caller);
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let record_id: i64 = tx.query_row(
            "SELECT COALESCE(MAX(record_id) + 1, 0) FROM file_record",
            [],
            |row| row.get(0),
        )?;
        let prev_hash: String = tx
            .query_row(
                "SELECT entry_hash FROM file_record ORDER BY record_id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or_else(|| GENESIS_HASH.to_string());

        let entry_hash = compute_entry_hash(&prev_hash, record_id, content_id, &recorded_by, run_id);

        tx.execute(
            r#"
            INSERT INTO file_record (
                record_id, content_id, recorded_by, run_id, prev_hash, entry_hash
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![record_id, content_id, recorded_by, run_id, prev_hash, entry_hash],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::info!(record_id, content_id, %recorded_by, "存证索引已追加");
        Ok(record_id)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 查询内容标识；不存在时返回空字符串哨兵
    pub fn content_id(&self, record_id: i64) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT content_id FROM file_record WHERE record_id = ?1",
                params![record_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.unwrap_or_else(|| NOT_FOUND_SENTINEL.to_string()))
    }

    /// 查询内容标识；哨兵值视为未找到
    pub fn require_content_id(&self, record_id: i64) -> RepositoryResult<String> {
        let content_id = self.content_id(record_id)?;
        if content_id == NOT_FOUND_SENTINEL {
            return Err(RepositoryError::NotFound {
                entity: "FileRecord".to_string(),
                id: record_id.to_string(),
            });
        }
        Ok(content_id)
    }

    /// 按 ID 查询完整索引行
    pub fn find_by_id(&self, record_id: i64) -> RepositoryResult<Option<FileRecordEntity>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                r#"
                SELECT record_id, content_id, recorded_by, run_id, prev_hash, entry_hash, recorded_at
                FROM file_record
                WHERE record_id = ?1
                "#,
                params![record_id],
                map_file_record,
            )
            .optional()?;
        Ok(result)
    }

    /// 查询全部索引行（按 ID 升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<FileRecordEntity>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT record_id, content_id, recorded_by, run_id, prev_hash, entry_hash, recorded_at
            FROM file_record
            ORDER BY record_id ASC
            "#,
        )?;

        let rows = stmt.query_map([], map_file_record)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// 已追加的记录数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM file_record", [], |row| row.get(0))?;
        Ok(count)
    }

    // ==========================================
    // 完整性校验
    // ==========================================

    /// 校验哈希链，返回校验通过的行数
    ///
    /// 检查项: ID 连续、prev_hash 衔接、entry_hash 可复算
    pub fn verify_chain(&self) -> RepositoryResult<usize> {
        let records = self.list_all()?;
        let mut expected_prev = GENESIS_HASH.to_string();

        for (expected_id, record) in records.iter().enumerate() {
            let expected_id = expected_id as i64;
            if record.record_id != expected_id {
                return Err(RepositoryError::ChainBroken {
                    record_id: record.record_id,
                    reason: format!("记录 ID 不连续，期望 {}", expected_id),
                });
            }
            if record.prev_hash != expected_prev {
                return Err(RepositoryError::ChainBroken {
                    record_id: record.record_id,
                    reason: "prev_hash 与上一行 entry_hash 不一致".to_string(),
                });
            }

            let recomputed = compute_entry_hash(
                &record.prev_hash,
                record.record_id,
                &record.content_id,
                &record.recorded_by,
                &record.run_id,
            );
            if recomputed != record.entry_hash {
                return Err(RepositoryError::ChainBroken {
                    record_id: record.record_id,
                    reason: "entry_hash 与内容不符".to_string(),
                });
            }

            expected_prev = record.entry_hash.clone();
        }

        tracing::debug!(rows = records.len(), "存证索引哈希链校验通过");
        Ok(records.len())
    }
}

fn map_file_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecordEntity> {
    Ok(FileRecordEntity {
        record_id: row.get(0)?,
        content_id: row.get(1)?,
        recorded_by: row.get(2)?,
        run_id: row.get(3)?,
        prev_hash: row.get(4)?,
        entry_hash: row.get(5)?,
        recorded_at: row.get(6)?,
    })
}
