// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、履历样本与临时文件
// ==========================================

#![allow(dead_code)]

use aircraft_rv_ledger::db::{init_schema, open_sqlite_connection};
use rusqlite::Connection;
use std::error::Error;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// 标准维修履历样本（未知机型 → DEFAULT 参数）
///
/// 预期（DEFAULT: 80M / 700 / 1400 / 0.04）:
/// - 行1: RV 80,000,000，储备金 0
/// - 行2: RV 75,400,000，储备金 2,800,000
/// - 行3: C-Check 回收 5,600,000 → RV 76,400,000，储备金 0
/// - 行4: RV 71,800,000，储备金 2,800,000
pub const SAMPLE_LOG: &str = "Date,TIS,Work Type\n\
2020-01-15,0,Delivery\n\
2021-01-15,2000,A-Check\n\
2022-01-15,4000,C-Check\n\
2023-01-15,6000,Line Maintenance\n";

/// 样本预期残值
pub const SAMPLE_EXPECTED_RV: [f64; 4] = [80_000_000.0, 75_400_000.0, 76_400_000.0, 71_800_000.0];

/// 样本预期储备金
pub const SAMPLE_EXPECTED_RESERVE: [f64; 4] = [0.0, 2_800_000.0, 0.0, 2_800_000.0];

/// 浮点近似比较
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "期望 {}，实际 {}",
        expected,
        actual
    );
}

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是合法 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 在目录中写入履历文件
pub fn write_log_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    Ok(path)
}
