// ==========================================
// 人事取込バックエンド - 取込模块错误类型
// ==========================================
// 分级: 批次级（DecodeError / ImportError）与行级（RowError）
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

// ==========================================
// DecodeError - 批次级: 文件无法解码
// ==========================================
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (expected .xlsx/.xls/.xlsm/.ods/.csv)")]
    UnsupportedFormat(String),

    #[error("file read failed: {0}")]
    FileRead(String),

    #[error("malformed spreadsheet: {0}")]
    Malformed(String),

    #[error("workbook has no worksheet")]
    NoWorksheet,

    #[error("file is empty (no header row)")]
    Empty,

    #[error("file has a header row but no data rows")]
    NoDataRows,
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::FileRead(err.to_string())
    }
}

impl From<csv::Error> for DecodeError {
    fn from(err: csv::Error) -> Self {
        DecodeError::Malformed(err.to_string())
    }
}

impl From<calamine::Error> for DecodeError {
    fn from(err: calamine::Error) -> Self {
        DecodeError::Malformed(err.to_string())
    }
}

// ==========================================
// RowError - 行级: 转为 Rejected 结果，批次继续
// ==========================================
// Display 即为返回给调用方的 reason 文本（不含行号）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("row could not be decoded: {message}")]
    Decode { row: usize, message: String },

    #[error("unknown columns: {}", unknown_columns.join(", "))]
    Mapping {
        row: usize,
        unknown_columns: Vec<String>,
    },

    #[error("invalid value for {field}: {value:?} ({reason})")]
    Coercion {
        row: usize,
        field: String,
        value: String,
        reason: String,
    },

    #[error("{reason}")]
    Validation {
        row: usize,
        field: String,
        reason: String,
    },

    #[error("storage error: {message}")]
    Storage { row: usize, message: String },
}

impl RowError {
    pub fn row(&self) -> usize {
        match self {
            RowError::Decode { row, .. }
            | RowError::Mapping { row, .. }
            | RowError::Coercion { row, .. }
            | RowError::Validation { row, .. }
            | RowError::Storage { row, .. } => *row,
        }
    }

    pub fn validation(row: usize, field: &str, reason: impl Into<String>) -> Self {
        RowError::Validation {
            row,
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// ==========================================
// ImportError - 批次级失败（不返回 summary）
// ==========================================
#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invalid import context: {0}")]
    InvalidContext(String),

    #[error("reference data unavailable: {0}")]
    ReferenceData(#[from] RepositoryError),
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
