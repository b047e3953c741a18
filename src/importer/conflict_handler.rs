// ==========================================
// 人事取込バックエンド - 批次内冲突检测
// ==========================================
// 职责: 同一文件内自然键重复时，保留首次出现，后续行拒绝
// ==========================================

use crate::domain::import::NaturalKey;
use crate::importer::error::RowError;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ConflictHandler {
    first_occurrence: HashMap<NaturalKey, usize>,
}

impl ConflictHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记自然键；重复则返回行级校验错误
    pub fn register(&mut self, key: &NaturalKey, row: usize) -> Result<(), RowError> {
        match self.first_occurrence.get(key) {
            Some(first_row) => Err(RowError::validation(
                row,
                "natural_key",
                format!(
                    "duplicate natural key in batch (first seen at row {})",
                    first_row
                ),
            )),
            None => {
                self.first_occurrence.insert(key.clone(), row);
                Ok(())
            }
        }
    }
}
