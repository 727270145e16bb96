// ==========================================
// 航空器残值台账 - 导入层
// ==========================================
// 职责: 维修履历文件读取、表头列角色映射、履历解析
// 支持: CSV, Excel
// ==========================================

// 模块声明
pub mod column_mapper;
pub mod error;
pub mod file_parser;
pub mod log_parser;

// 重导出核心类型
pub use column_mapper::{ColumnLayout, ColumnRole, COLUMN_ROLE_RULES};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvLogReader, ExcelLogReader, LogFileReader, UniversalLogReader};
pub use log_parser::{
    parse_events, parse_maintenance_log, MaintenanceLogParser, ParseWarning, ParsedLog,
};
