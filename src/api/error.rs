// ==========================================
// 人事取込バックエンド - API层错误类型
// ==========================================
// 职责: 汇总下层错误，为调用方（HTTP 层 / CLI）提供统一错误
// ==========================================

use crate::importer::error::{DecodeError, ImportError};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 调用方输入 =====
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // ===== 取込 =====
    #[error("import failed: {0}")]
    Import(ImportError),

    #[error("import timed out after {0}s")]
    Timeout(u64),

    // ===== 基础设施 =====
    #[error("database error: {0}")]
    Database(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 取込上下文由调用方提供，上下文错误归为输入错误
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::InvalidContext(msg) => ApiError::InvalidInput(msg),
            other => ApiError::Import(other),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Database(err.to_string())
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        ApiError::Import(ImportError::Decode(err))
    }
}

/// API层Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;
