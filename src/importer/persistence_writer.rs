// ==========================================
// 人事取込バックエンド - 落库写入器
// ==========================================
// 职责: 按自然键 insert / update，每行一个事务
// 约束: 写入失败转为行级错误，不中断批次
// ==========================================

use crate::domain::import::{CanonicalRecord, EntityId, NaturalKey};
use crate::importer::error::RowError;
use crate::repository::ImportRepository;
use tracing::warn;

/// 单行写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Written {
    pub entity_id: EntityId,
    pub was_update: bool,
}

pub struct PersistenceWriter<'a, R: ImportRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: ImportRepository + ?Sized> PersistenceWriter<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// 写入已校验的记录
    ///
    /// 查找与写入在同一事务内完成；已提交的其他行不受影响
    pub async fn write(
        &self,
        key: &NaturalKey,
        record: &CanonicalRecord,
    ) -> Result<Written, RowError> {
        match self.repo.upsert(key, record).await {
            Ok(outcome) => Ok(Written {
                entity_id: outcome.entity_id,
                was_update: outcome.was_update,
            }),
            Err(e) => {
                warn!(row = record.row_index, key = %key, error = %e, "行写入失败");
                Err(RowError::Storage {
                    row: record.row_index,
                    message: e.to_string(),
                })
            }
        }
    }
}
