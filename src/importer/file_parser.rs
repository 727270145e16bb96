// ==========================================
// 航空器残值台账 - 履历文件读取
// ==========================================
// 职责: 文件 → 维修履历分隔符文本（交由 MaintenanceLogParser 解析）
// 支持: CSV (.csv) / Excel (.xlsx/.xls，读取第一个工作表)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use csv::WriterBuilder;
use std::path::Path;

/// 履历文件读取接口
pub trait LogFileReader {
    /// 读取文件并转换为分隔符文本
    fn read_to_text(&self, file_path: &Path) -> ImportResult<String>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Reader 实现
// ==========================================
pub struct CsvLogReader;

impl LogFileReader for CsvLogReader {
    fn read_to_text(&self, file_path: &Path) -> ImportResult<String> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 非 UTF-8 字节替换为 U+FFFD，不拒绝整个文件
        let bytes = std::fs::read(file_path)?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    file = %file_path.display(),
                    valid_up_to = e.utf8_error().valid_up_to(),
                    "CSV 含非 UTF-8 字节，已按替换字符解码"
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(text)
    }
}

// ==========================================
// Excel Reader 实现
// ==========================================
pub struct ExcelLogReader;

impl LogFileReader for ExcelLogReader {
    fn read_to_text(&self, file_path: &Path) -> ImportResult<String> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // 逐行写出为 CSV 文本，含分隔符的单元格由 csv 自动加引号
        let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(cell_to_text).collect();
            writer.write_record(&cells)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ImportError::InternalError(format!("CSV 缓冲区写出失败: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| ImportError::InternalError(e.to_string()))
    }
}

/// 单元格 → 文本；日期单元格写为 YYYY-MM-DD（否则会输出 Excel 序列号）
fn cell_to_text(cell: &Data) -> String {
    let is_date = match cell {
        Data::DateTime(dt) => dt.is_datetime(),
        Data::DateTimeIso(_) => true,
        _ => false,
    };
    if is_date {
        if let Some(date) = cell.as_date() {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    cell.to_string()
}

// ==========================================
// 通用读取器（根据扩展名自动选择）
// ==========================================
pub struct UniversalLogReader;

impl UniversalLogReader {
    pub fn read<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<String> {
        let path = file_path.as_ref();
        match extension_of(path).as_str() {
            "csv" => CsvLogReader.read_to_text(path),
            "xlsx" | "xls" => ExcelLogReader.read_to_text(path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_csv_reader_valid_file() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "Date,TIS,Work Type").unwrap();
        writeln!(temp_file, "2024-01-01,0,Delivery").unwrap();

        let text = CsvLogReader.read_to_text(temp_file.path()).unwrap();
        assert!(text.starts_with("Date,TIS,Work Type"));
        assert!(text.contains("Delivery"));
    }

    #[test]
    fn test_csv_reader_decodes_invalid_utf8_lossily() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        temp_file
            .write_all(b"Date,TIS,Work Type\n2024-01-01,5,L\xffine\n")
            .unwrap();

        let text = CsvLogReader.read_to_text(temp_file.path()).unwrap();
        assert!(text.contains("2024-01-01,5,L\u{FFFD}ine"));
    }

    #[test]
    fn test_csv_reader_file_not_found() {
        let result = CsvLogReader.read_to_text(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_reader_rejects_other_extension() {
        let temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = CsvLogReader.read_to_text(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "txt"));
    }

    #[test]
    fn test_universal_reader_dispatch() {
        let mut temp_file = Builder::new().suffix(".CSV").tempfile().unwrap();
        writeln!(temp_file, "Date,TIS").unwrap();
        assert!(UniversalLogReader.read(temp_file.path()).is_ok());

        let result = UniversalLogReader.read("history.json");
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_cell_to_text_formats_dates() {
        use calamine::{ExcelDateTime, ExcelDateTimeType};

        let serial = Data::DateTime(ExcelDateTime::new(45292.0, ExcelDateTimeType::DateTime, false));
        assert_eq!(cell_to_text(&serial), "2024-01-01");

        let with_time = Data::DateTime(ExcelDateTime::new(45292.75, ExcelDateTimeType::DateTime, false));
        assert_eq!(cell_to_text(&with_time), "2024-01-01");

        let iso = Data::DateTimeIso("2024-03-05".to_string());
        assert_eq!(cell_to_text(&iso), "2024-03-05");

        // 时长与普通数值保持原样
        let duration = Data::DateTime(ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false));
        assert_eq!(cell_to_text(&duration), "1.5");
        assert_eq!(cell_to_text(&Data::Float(1200.0)), "1200");
        assert_eq!(cell_to_text(&Data::String("C-Check".to_string())), "C-Check");
    }

    #[test]
    fn test_excel_reader_invalid_content() {
        let mut temp_file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        writeln!(temp_file, "not a workbook").unwrap();
        let result = ExcelLogReader.read_to_text(temp_file.path());
        assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
    }
}
