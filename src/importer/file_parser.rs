// ==========================================
// 人事取込バックエンド - 文件解析器（Row Decoder）
// ==========================================
// 支持: Excel (.xlsx/.xls/.xlsm/.ods) / CSV (.csv)
// 规则: 首行为表头，表头原文作为键；全空行跳过但保留行号
// ==========================================

use crate::domain::import::{CellValue, RawRow};
use crate::importer::error::{DecodeError, RowError};
use crate::importer::importer_trait::{DecodedSheet, FileParser, RowStream};
use calamine::{open_workbook_auto, Data, Range, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "xlsb", "ods"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> Result<(), DecodeError> {
    if !path.exists() {
        return Err(DecodeError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

/// 至少一行数据，否则批次级失败
fn finish_sheet(headers: Vec<String>, rows: RowStream) -> Result<DecodedSheet, DecodeError> {
    let mut rows = rows.peekable();
    if rows.peek().is_none() {
        return Err(DecodeError::NoDataRows);
    }
    Ok(DecodedSheet {
        headers,
        rows: Box::new(rows),
    })
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn open(&self, file_path: &Path) -> Result<DecodedSheet, DecodeError> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(DecodeError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(DecodeError::Empty);
        }

        let keys: Arc<[String]> = headers.clone().into();
        let rows = reader
            .into_records()
            .enumerate()
            .filter_map(move |(idx, result)| {
                let row_index = idx + 1;
                let record = match result {
                    Ok(record) => record,
                    Err(e) => {
                        return Some(Err(RowError::Decode {
                            row: row_index,
                            message: e.to_string(),
                        }))
                    }
                };

                let cells = keys
                    .iter()
                    .enumerate()
                    .map(|(col_idx, header)| {
                        let value = record.get(col_idx).map(CellValue::text);
                        (header.clone(), value.unwrap_or(CellValue::Empty))
                    })
                    .collect();
                let row = RawRow { row_index, cells };

                // 跳过完全空白的行
                if row.is_blank() {
                    None
                } else {
                    Some(Ok(row))
                }
            });

        finish_sheet(headers, Box::new(rows))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn open(&self, file_path: &Path) -> Result<DecodedSheet, DecodeError> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            return Err(DecodeError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(DecodeError::NoWorksheet)?;
        let range = workbook.worksheet_range(&sheet_name)?;

        if range.is_empty() {
            return Err(DecodeError::Empty);
        }

        // 提取表头（第一行）
        let headers: Vec<String> = (0..range.width())
            .map(|col| {
                range
                    .get((0, col))
                    .map(|cell| cell.to_string())
                    .unwrap_or_default()
            })
            .collect();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(DecodeError::Empty);
        }

        let rows = ExcelRows {
            headers: headers.clone().into(),
            range,
            next: 1,
        };
        finish_sheet(headers, Box::new(rows))
    }
}

/// 按需把 Range 中的数据行转换为 RawRow
struct ExcelRows {
    headers: Arc<[String]>,
    range: Range<Data>,
    next: usize,
}

impl Iterator for ExcelRows {
    type Item = Result<RawRow, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.range.height() {
            let pos = self.next;
            self.next += 1;

            let cells = self
                .headers
                .iter()
                .enumerate()
                .map(|(col, header)| {
                    let value = self
                        .range
                        .get((pos, col))
                        .map(cell_value)
                        .unwrap_or(CellValue::Empty);
                    (header.clone(), value)
                })
                .collect();
            let row = RawRow {
                row_index: pos,
                cells,
            };

            if !row.is_blank() {
                return Some(Ok(row));
            }
        }
        None
    }
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateTime(naive),
            None => CellValue::Text(cell.to_string()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn is_supported(file_name: &str) -> bool {
        let ext = extension_of(Path::new(file_name));
        ext == "csv" || EXCEL_EXTENSIONS.contains(&ext.as_str())
    }
}

impl FileParser for UniversalFileParser {
    fn open(&self, file_path: &Path) -> Result<DecodedSheet, DecodeError> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.open(file_path),
            ext if EXCEL_EXTENSIONS.contains(&ext) => ExcelParser.open(file_path),
            ext => Err(DecodeError::UnsupportedFormat(ext.to_string())),
        }
    }
}
