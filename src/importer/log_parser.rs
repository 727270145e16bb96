// ==========================================
// 航空器残值台账 - 维修履历解析器
// ==========================================
// 职责: 分隔符文本 → 有序 MaintenanceEvent 序列
// 输入: 首行为表头；支持任意换行风格；逐行独立切分，引号字段可包含分隔符（不可跨行）
// 容错: 列缺失 / 数值无法解析 / 日期无法解析 → 以默认值替代并记录告警，绝不中断
// ==========================================

use crate::domain::event::{EventDate, MaintenanceEvent};
use crate::importer::column_mapper::{ColumnLayout, ColumnRole};
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::fmt;
use tracing::instrument;

// ==========================================
// ParseWarning - 解析告警（非致命）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// 表头中找不到角色列，整列按默认值处理
    MissingColumn { role: ColumnRole },

    /// TIS 无法解析，按 0 处理
    InvalidNumber { row: usize, value: String },

    /// TIS 仅前缀可解析（如 "1200 FH"），按前缀数值处理
    PartialNumber { row: usize, value: String, parsed: f64 },

    /// 日期无法解析，按原文保留
    InvalidDate { row: usize, value: String },

    /// 行格式错误（如引号未闭合），按逗号直接切分
    MalformedRow { row: usize, message: String },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::MissingColumn { role } => {
                write!(f, "缺少列 '{}'，按默认值处理", role)
            }
            ParseWarning::InvalidNumber { row, value } => {
                write!(f, "行 {}: TIS 无法解析 '{}'，按 0 处理", row, value)
            }
            ParseWarning::PartialNumber { row, value, parsed } => {
                write!(f, "行 {}: TIS '{}' 仅前缀可解析，按 {} 处理", row, value, parsed)
            }
            ParseWarning::InvalidDate { row, value } => {
                write!(f, "行 {}: 日期无法解析 '{}'，按原文保留", row, value)
            }
            ParseWarning::MalformedRow { row, message } => {
                write!(f, "行 {}: 格式错误，已按逗号切分 ({})", row, message)
            }
        }
    }
}

/// 解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    pub layout: ColumnLayout,
    pub events: Vec<MaintenanceEvent>,
    pub warnings: Vec<ParseWarning>,
}

// ==========================================
// 数值解析
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
enum DecimalCell {
    Blank,
    Exact(f64),
    Prefix(f64),
    Invalid,
}

fn parse_decimal_cell(value: &str) -> DecimalCell {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return DecimalCell::Blank;
    }

    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => DecimalCell::Exact(n),
        Ok(_) => DecimalCell::Invalid,
        Err(_) => leading_decimal(trimmed)
            .map(DecimalCell::Prefix)
            .unwrap_or(DecimalCell::Invalid),
    }
}

/// 取最长的十进制数前缀（符号、整数、小数、指数）
fn leading_decimal(value: &str) -> Option<f64> {
    let bytes = value.as_bytes();
    let scan_digits = |mut pos: usize| {
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        pos
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_start = end;
    end = scan_digits(end);
    let mut mantissa_digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = scan_digits(end + 1);
        mantissa_digits += frac_end - (end + 1);
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }

    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = scan_digits(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    value[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

// ==========================================
// MaintenanceLogParser - 维修履历解析器
// ==========================================
pub struct MaintenanceLogParser;

impl MaintenanceLogParser {
    /// 解析维修履历文本（不会失败）
    ///
    /// 按物理行逐行切分，单行格式错误不影响后续行
    #[instrument(skip(self, raw_text), fields(bytes = raw_text.len()))]
    pub fn parse(&self, raw_text: &str) -> ParsedLog {
        let text = raw_text.strip_prefix('\u{feff}').unwrap_or(raw_text);
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

        let mut parsed = ParsedLog::default();
        let mut lines = normalized
            .split('\n')
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        // 首个非空行为表头
        let (header_row, header_line) = match lines.next() {
            Some(entry) => entry,
            None => return parsed,
        };
        let headers = split_line(header_line, header_row, &mut parsed.warnings);
        parsed.layout = ColumnLayout::from_headers(&headers);
        for role in parsed.layout.missing_roles() {
            parsed.warnings.push(ParseWarning::MissingColumn { role });
        }

        for (row, line) in lines {
            let cells = split_line(line, row, &mut parsed.warnings);

            // 跳过完全空白的行
            if cells.iter().all(|v| v.trim().is_empty()) {
                continue;
            }

            let event = self.map_record(&cells, row, &parsed.layout, &mut parsed.warnings);
            parsed.events.push(event);
        }

        finish(parsed)
    }

    /// 单行 → MaintenanceEvent
    fn map_record(
        &self,
        cells: &[String],
        row: usize,
        layout: &ColumnLayout,
        warnings: &mut Vec<ParseWarning>,
    ) -> MaintenanceEvent {
        let cell = |role: ColumnRole| {
            layout
                .index_of(role)
                .and_then(|idx| cells.get(idx))
                .map(|v| v.trim())
                .unwrap_or("")
        };

        let date_raw = cell(ColumnRole::Date);
        let date = EventDate::parse(date_raw);
        if !date.is_blank() && date.calendar().is_none() {
            warnings.push(ParseWarning::InvalidDate {
                row,
                value: date_raw.to_string(),
            });
        }

        let tis_raw = cell(ColumnRole::TimeInService);
        let time_in_service = match parse_decimal_cell(tis_raw) {
            DecimalCell::Blank => 0.0,
            DecimalCell::Exact(n) => n,
            DecimalCell::Prefix(n) => {
                warnings.push(ParseWarning::PartialNumber {
                    row,
                    value: tis_raw.to_string(),
                    parsed: n,
                });
                n
            }
            DecimalCell::Invalid => {
                warnings.push(ParseWarning::InvalidNumber {
                    row,
                    value: tis_raw.to_string(),
                });
                0.0
            }
        };

        MaintenanceEvent::new(date, time_in_service, cell(ColumnRole::WorkType)).with_row_number(row)
    }
}

/// 单个物理行 → 单元格
///
/// 引号未闭合或 csv 读取失败时按逗号直接切分，并记录 MalformedRow 告警
fn split_line(line: &str, row: usize, warnings: &mut Vec<ParseWarning>) -> Vec<String> {
    let naive = || line.split(',').map(str::to_string).collect::<Vec<_>>();

    if line.matches('"').count() % 2 != 0 {
        warnings.push(ParseWarning::MalformedRow {
            row,
            message: "引号未闭合，按逗号直接切分".to_string(),
        });
        return naive();
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => record.iter().map(str::to_string).collect(),
        Ok(false) => Vec::new(),
        Err(e) => {
            warnings.push(ParseWarning::MalformedRow {
                row,
                message: e.to_string(),
            });
            naive()
        }
    }
}

fn finish(parsed: ParsedLog) -> ParsedLog {
    for warning in &parsed.warnings {
        tracing::warn!(%warning, "维修履历解析告警");
    }
    tracing::debug!(
        events = parsed.events.len(),
        warnings = parsed.warnings.len(),
        "维修履历解析完成"
    );
    parsed
}

/// 解析维修履历文本
pub fn parse_maintenance_log(raw_text: &str) -> ParsedLog {
    MaintenanceLogParser.parse(raw_text)
}

/// 解析维修履历文本，仅返回事件序列
pub fn parse_events(raw_text: &str) -> Vec<MaintenanceEvent> {
    parse_maintenance_log(raw_text).events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_basic_log() {
        let text = "Date,TIS,Work Type\n2024-01-01,0,Delivery\n2024-06-01,1000,C-Check\n";
        let parsed = parse_maintenance_log(text);

        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.events.len(), 2);
        assert_eq!(
            parsed.events[0].date.calendar(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(parsed.events[1].time_in_service, 1000.0);
        assert_eq!(parsed.events[1].work_type, "C-Check");
        assert_eq!(parsed.events[1].row_number, 3);
    }

    #[test]
    fn test_parse_line_endings_and_blank_lines() {
        let text = "Date,TIS,Work Type\r\n2024-01-01,10,A\r\n\r\n2024-01-02,20,B\r2024-01-03,30,C\n\n";
        let events = parse_events(text);
        let tis: Vec<f64> = events.iter().map(|e| e.time_in_service).collect();
        assert_eq!(tis, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_parse_quoted_field_with_delimiter() {
        let text = "Date,Work Type,TIS\n2024-01-01,\"C-Check, heavy\",1500\n";
        let events = parse_events(text);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].work_type, "C-Check, heavy");
        assert_eq!(events[0].time_in_service, 1500.0);
    }

    #[test]
    fn test_parse_missing_columns_use_defaults() {
        let text = "Date,Remarks\n2024-01-01,ok\n";
        let parsed = parse_maintenance_log(text);

        assert_eq!(parsed.events.len(), 1);
        assert_eq!(parsed.events[0].time_in_service, 0.0);
        assert_eq!(parsed.events[0].work_type, "");
        assert!(parsed.warnings.contains(&ParseWarning::MissingColumn {
            role: ColumnRole::TimeInService
        }));
        assert!(parsed.warnings.contains(&ParseWarning::MissingColumn {
            role: ColumnRole::WorkType
        }));
    }

    #[test]
    fn test_parse_invalid_number_defaults_to_zero() {
        let text = "Date,TIS,Work Type\n2024-01-01,abc,Line\n2024-01-02,,Line\n";
        let parsed = parse_maintenance_log(text);

        assert_eq!(parsed.events[0].time_in_service, 0.0);
        assert_eq!(parsed.events[1].time_in_service, 0.0);
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::InvalidNumber {
                row: 2,
                value: "abc".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_numeric_prefix() {
        let text = "Date,TIS,Work Type\n2024-01-01,1200.5 FH,Line\n";
        let parsed = parse_maintenance_log(text);
        assert_eq!(parsed.events[0].time_in_service, 1200.5);
        assert!(matches!(
            parsed.warnings[0],
            ParseWarning::PartialNumber { row: 2, .. }
        ));
    }

    #[test]
    fn test_parse_non_finite_number_defaults_to_zero() {
        let text = "Date,TIS,Work Type\n2024-01-01,NaN,Line\n2024-01-02,inf,Line\n";
        let events = parse_events(text);
        assert_eq!(events[0].time_in_service, 0.0);
        assert_eq!(events[1].time_in_service, 0.0);
    }

    #[test]
    fn test_parse_invalid_date_is_kept_opaque() {
        let text = "Date,TIS,Work Type\nlast tuesday,5,Line\n2024-01-02,6,Line\n";
        let parsed = parse_maintenance_log(text);

        assert_eq!(parsed.events.len(), 2);
        assert_eq!(parsed.events[0].date.as_str(), "last tuesday");
        assert_eq!(parsed.events[0].date.calendar(), None);
        assert!(parsed.events[1].date.calendar().is_some());
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::InvalidDate {
                row: 2,
                value: "last tuesday".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_short_rows_are_kept() {
        let text = "Date,TIS,Work Type\n2024-01-01,100\n";
        let events = parse_events(text);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time_in_service, 100.0);
        assert_eq!(events[0].work_type, "");
    }

    #[test]
    fn test_parse_skips_all_blank_rows() {
        let text = "Date,TIS,Work Type\n,,\n2024-01-01,1,A\n , , \n";
        assert_eq!(parse_events(text).len(), 1);
    }

    #[test]
    fn test_parse_empty_and_header_only() {
        assert_eq!(parse_maintenance_log(""), ParsedLog::default());
        let parsed = parse_maintenance_log("Date,TIS,Work Type\n");
        assert!(parsed.events.is_empty());
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_parse_strips_bom() {
        let text = "\u{feff}Date,TIS,Work Type\n2024-01-01,7,Line\n";
        let parsed = parse_maintenance_log(text);
        assert_eq!(parsed.layout.date, Some(0));
        assert_eq!(parsed.events[0].time_in_service, 7.0);
    }

    #[test]
    fn test_parse_unterminated_quote_is_confined_to_its_line() {
        let text = "Date,TIS,Work Type\n\
                    2024-01-01,100,\"Line\n\
                    2024-02-01,200,Line\n\
                    2024-03-01,300,C-Check\n\
                    2024-04-01,400,Line\n";
        let parsed = parse_maintenance_log(text);

        assert_eq!(parsed.events.len(), 4);
        assert_eq!(parsed.events[0].time_in_service, 100.0);
        assert_eq!(parsed.events[0].work_type, "\"Line");
        assert_eq!(parsed.events[2].work_type, "C-Check");
        assert_eq!(parsed.events[3].row_number, 5);
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::MalformedRow {
                row: 2,
                message: "引号未闭合，按逗号直接切分".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_escaped_quotes_stay_on_one_line() {
        let text = "Date,TIS,Work Type\n2024-01-01,5,\"Line \"\"night\"\"\"\n2024-01-02,6,Line\n";
        let parsed = parse_maintenance_log(text);
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.events.len(), 2);
        assert_eq!(parsed.events[0].work_type, "Line \"night\"");
    }

    #[test]
    fn test_leading_decimal() {
        assert_eq!(leading_decimal("1,234"), Some(1.0));
        assert_eq!(leading_decimal("-2.5e3x"), Some(-2500.0));
        assert_eq!(leading_decimal("7e"), Some(7.0));
        assert_eq!(leading_decimal(".5h"), Some(0.5));
        assert_eq!(leading_decimal("hrs 5"), None);
        assert_eq!(leading_decimal("-"), None);
        assert_eq!(leading_decimal("."), None);
    }
}
