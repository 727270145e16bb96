// ==========================================
// 航空器残值台账 - 估值产物序列化
// ==========================================
// 职责: ValuationRecord 序列 ⇄ 分隔符文本（上传内容寻址存储 / 回取展示）
// 列顺序固定: date, tis, workType, rv, mr, note
// 数值按最短可往返形式写出，序列化后再解析可得到相同数值
// 机队汇总: 每行 label,latestRV（无事件时 RV 为空），不带表头
// ==========================================

use crate::domain::valuation::ValuationRecord;
use crate::engine::fleet::FleetValuation;
use crate::importer::error::{ImportError, ImportResult};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

/// 估值产物表头（列顺序即产物 schema）
pub const VALUATION_HEADERS: [&str; 6] = ["date", "tis", "workType", "rv", "mr", "note"];

/// 估值记录 → 分隔符文本；空序列输出空字符串
pub fn to_delimited_text(records: &[ValuationRecord]) -> ImportResult<String> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(VALUATION_HEADERS)?;

    for record in records {
        writer.write_record([
            record.date.clone(),
            record.time_in_service.to_string(),
            record.work_type.clone(),
            record.residual_value.to_string(),
            record.reserve_balance.to_string(),
            record.note.clone(),
        ])?;
    }

    finish(writer)
}

/// 机队估值 → 汇总文本（label 含逗号/引号时按 CSV 规则加引号）
pub fn fleet_summary_text(valuations: &[FleetValuation]) -> ImportResult<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    for valuation in valuations {
        let rv = valuation
            .latest_residual_value()
            .map(|rv| rv.to_string())
            .unwrap_or_default();
        writer.write_record([valuation.label.as_str(), rv.as_str()])?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> ImportResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::InternalError(format!("CSV 缓冲区写出失败: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ImportError::InternalError(e.to_string()))
}

/// 分隔符文本 → 估值记录
///
/// 估值产物为机器生成，数值列无法解析视为产物损坏，直接报错
pub fn from_delimited_text(text: &str) -> ImportResult<Vec<ValuationRecord>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(text.as_bytes());

    check_headers(reader.headers()?)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        if row.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let line = row.position().map(|p| p.line() as usize).unwrap_or(0);

        records.push(ValuationRecord {
            date: row.get(0).unwrap_or("").to_string(),
            time_in_service: parse_number(&row, 1, line)?,
            work_type: row.get(2).unwrap_or("").to_string(),
            residual_value: parse_number(&row, 3, line)?,
            reserve_balance: parse_number(&row, 4, line)?,
            note: row.get(5).unwrap_or("").to_string(),
        });
    }

    Ok(records)
}

/// 前五列必须与产物表头一致（note 列可缺省）
fn check_headers(headers: &StringRecord) -> ImportResult<()> {
    let matches = VALUATION_HEADERS[..5]
        .iter()
        .enumerate()
        .all(|(idx, expected)| {
            headers
                .get(idx)
                .map(|h| h.trim().eq_ignore_ascii_case(expected))
                .unwrap_or(false)
        });

    if matches {
        Ok(())
    } else {
        Err(ImportError::ArtifactSchemaMismatch {
            expected: VALUATION_HEADERS.join(","),
            actual: headers.iter().collect::<Vec<_>>().join(","),
        })
    }
}

fn parse_number(row: &StringRecord, idx: usize, line: usize) -> ImportResult<f64> {
    let value = row.get(idx).unwrap_or("").trim();
    value
        .parse::<f64>()
        .map_err(|_| ImportError::TypeConversionError {
            row: line,
            field: VALUATION_HEADERS[idx].to_string(),
            message: format!("无法解析为浮点数: '{}'", value),
        })
}
