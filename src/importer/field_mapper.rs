// ==========================================
// 人事取込バックエンド - 字段映射器实现
// ==========================================
// 职责: 源表头 → 标准字段映射 + 类型转换
// 约束: 任一字段转换失败则整行拒绝，不做部分映射
// ==========================================

use crate::domain::import::{CanonicalRecord, CellValue, FieldValue, RawRow};
use crate::domain::types::{EntityKind, Gender, VisaType};
use crate::importer::error::RowError;
use crate::importer::header_dictionary::{self, EnumKind, FieldSpec, FieldType};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

/// 接受的日期格式（按顺序尝试）
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%Y.%m.%d", "%Y年%m月%d日"];

/// 带时间部分的日期格式（只取日期）
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S"];

pub struct FieldMapper;

impl FieldMapper {
    /// 将原始行映射为 CanonicalRecord
    ///
    /// # 参数
    /// - row: 解码后的原始行
    /// - kind: 目标实体种类（决定表头字典）
    /// - strict: 严格模式下字典外的列视为映射错误
    pub fn map_row(
        &self,
        row: &RawRow,
        kind: EntityKind,
        strict: bool,
    ) -> Result<CanonicalRecord, RowError> {
        let mut record = CanonicalRecord::new(row.row_index, kind);
        let mut unknown_columns = Vec::new();

        for (header, cell) in &row.cells {
            let spec = match header_dictionary::lookup(kind, header) {
                Some(spec) => spec,
                None => {
                    if !header.trim().is_empty() {
                        unknown_columns.push(header.clone());
                    }
                    continue;
                }
            };

            // 同一字段多个别名列同时出现时，先出现的非空值优先
            if record.contains(spec.canonical) {
                continue;
            }

            if let Some(value) = self.coerce(spec, cell, row.row_index)? {
                record.insert(spec.canonical, value);
            }
        }

        if !unknown_columns.is_empty() {
            if strict {
                return Err(RowError::Mapping {
                    row: row.row_index,
                    unknown_columns,
                });
            }
            debug!(row = row.row_index, columns = ?unknown_columns, "忽略字典外的列");
        }

        Ok(record)
    }

    /// 单字段类型转换；空单元格返回 None
    fn coerce(
        &self,
        spec: &FieldSpec,
        cell: &CellValue,
        row: usize,
    ) -> Result<Option<FieldValue>, RowError> {
        if cell.is_blank() {
            return Ok(None);
        }

        let fail = |reason: &str| RowError::Coercion {
            row,
            field: spec.canonical.to_string(),
            value: cell.to_string(),
            reason: reason.to_string(),
        };

        let value = match spec.field_type {
            FieldType::Text => match text_of(cell) {
                Some(text) => FieldValue::Text(text),
                None => return Ok(None),
            },
            FieldType::Integer => FieldValue::Integer(parse_integer(cell).ok_or_else(|| fail("not an integer"))?),
            FieldType::Date => FieldValue::Date(parse_date(cell).ok_or_else(|| fail("unrecognized date format"))?),
            FieldType::Time => FieldValue::Time(parse_time(cell).ok_or_else(|| fail("unrecognized time format"))?),
            FieldType::Enum(kind) => {
                let raw = text_of(cell).unwrap_or_default();
                let (label, allowed) = match kind {
                    EnumKind::Gender => (
                        Gender::parse_label(&raw).map(|g| g.as_str()),
                        Gender::ALLOWED_LABELS.to_vec(),
                    ),
                    EnumKind::VisaType => (
                        VisaType::parse_label(&raw).map(|v| v.as_str()),
                        VisaType::allowed_labels(),
                    ),
                };
                let label = label.ok_or_else(|| {
                    fail(&format!("not an allowed value (allowed: {})", allowed.join(", ")))
                })?;
                FieldValue::Text(label.to_string())
            }
        };

        Ok(Some(value))
    }
}

/// 文本化；数值型单元格（电话、邮编、ID 常被 Excel 存为数字）去掉 ".0"
fn text_of(cell: &CellValue) -> Option<String> {
    let text = match cell {
        CellValue::Empty => return None,
        CellValue::Text(s) => s.trim().to_string(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        CellValue::Float(f) => f.to_string(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::DateTime(dt) => {
            if dt.time() == NaiveTime::MIN {
                dt.date().format("%Y-%m-%d").to_string()
            } else {
                dt.format("%Y-%m-%d %H:%M:%S").to_string()
            }
        }
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn parse_integer(cell: &CellValue) -> Option<i64> {
    match cell {
        CellValue::Int(i) => Some(*i),
        CellValue::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(*f as i64),
        CellValue::Text(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Int(serial) => excel_serial_date(*serial as f64),
        CellValue::Float(serial) => excel_serial_date(*serial),
        CellValue::Text(s) => parse_date_text(s.trim()),
        _ => None,
    }
}

pub(crate) fn parse_date_text(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            // 带时区偏移的 ISO 时间取其本地日期
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Excel 1900 日期系统序列号
/// 1..=59 基准 1899-12-31；60 为虚构的 1900-02-29，不接受；61 起基准 1899-12-30
fn excel_serial_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let days = serial.floor() as i64;
    let base = match days {
        1..=59 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        60 => return None,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    base.checked_add_signed(Duration::days(days))
}

fn parse_time(cell: &CellValue) -> Option<NaiveTime> {
    match cell {
        CellValue::DateTime(dt) => Some(dt.time()),
        // Excel 时间单元格: 一天的小数
        CellValue::Float(fraction) if (0.0..1.0).contains(fraction) => {
            let seconds = (fraction * 86_400.0).round() as u32;
            NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0)
        }
        CellValue::Text(s) => {
            let value = s.trim();
            TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
        }
        _ => None,
    }
}
