// ==========================================
// 人事取込バックエンド - 取込 Trait
// ==========================================
// 职责: 定义文件解析与取込管道接口（不包含实现）
// ==========================================

use crate::domain::import::{ImportContext, ImportSummary, RawRow};
use crate::domain::types::EntityKind;
use crate::importer::error::{DecodeError, ImportError, RowError};
use async_trait::async_trait;
use std::path::Path;

/// 惰性行序列；单行解码失败以 Err 形式出现，由管道转为 Rejected
pub type RowStream = Box<dyn Iterator<Item = Result<RawRow, RowError>> + Send>;

/// 已打开的工作表：表头 + 数据行
pub struct DecodedSheet {
    pub headers: Vec<String>,
    pub rows: RowStream,
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（Row Decoder）
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 打开文件并返回惰性行序列
    ///
    /// # 返回
    /// - Ok(DecodedSheet): 至少包含一行数据
    /// - Err(DecodeError): 文件缺失/格式错误/无表头/无数据行
    ///
    /// 序列只能遍历一次，重新读取需要重新打开文件
    fn open(&self, file_path: &Path) -> Result<DecodedSheet, DecodeError>;
}

// ==========================================
// TabularImporter Trait
// ==========================================
// 用途: 取込管道主接口
// 实现者: ImportPipeline
#[async_trait]
pub trait TabularImporter: Send + Sync {
    /// 从表格文件取込一批记录
    ///
    /// # 参数
    /// - file_path: 上传文件落地后的路径
    /// - entity_kind: employee | timer_card
    /// - context: timer_card 必须携带工厂 + 年月
    ///
    /// # 返回
    /// - Ok(ImportSummary): 每一行都有且仅有一个结果
    /// - Err(ImportError): 批次级失败（无法解码、上下文非法、参照数据不可读）
    async fn import(
        &self,
        file_path: &Path,
        entity_kind: EntityKind,
        context: &ImportContext,
    ) -> Result<ImportSummary, ImportError>;
}
