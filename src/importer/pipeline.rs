// ==========================================
// 人事取込バックエンド - 取込管道实现
// ==========================================
// 职责: 整合取込流程，从文件到数据库
// 流程: 解码 → 映射 → 校验 → 冲突检测 → 落库 → 汇总
// 约束: 行级失败不影响其他行；批次级失败不写入任何行
// ==========================================

use crate::domain::import::{
    CanonicalRecord, FieldValue, ImportBatch, ImportContext, ImportSummary, NaturalKey, RawRow,
    RowOutcome,
};
use crate::domain::types::EntityKind;
use crate::importer::aggregator::ResultAggregator;
use crate::importer::conflict_handler::ConflictHandler;
use crate::importer::error::{ImportError, RowError};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{FileParser, TabularImporter};
use crate::importer::persistence_writer::PersistenceWriter;
use crate::importer::row_validator::RowValidator;
use crate::perf::PerfGuard;
use crate::repository::ImportRepository;
use async_trait::async_trait;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// 每处理多少行让出一次执行权（超时与并发批次依赖于此）
const YIELD_EVERY_ROWS: usize = 100;

// ==========================================
// ImportPipeline - 取込管道
// ==========================================
pub struct ImportPipeline<R>
where
    R: ImportRepository,
{
    // 数据访问层
    repo: R,

    // 取込组件
    file_parser: Box<dyn FileParser>,
    field_mapper: FieldMapper,
}

impl<R> ImportPipeline<R>
where
    R: ImportRepository,
{
    /// 创建管道（默认按扩展名选择解析器）
    pub fn new(repo: R) -> Self {
        Self::with_parser(repo, Box::new(UniversalFileParser))
    }

    pub fn with_parser(repo: R, file_parser: Box<dyn FileParser>) -> Self {
        Self {
            repo,
            file_parser,
            field_mapper: FieldMapper,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 批次入口的上下文检查
    fn check_context(entity_kind: EntityKind, context: &ImportContext) -> Result<(), ImportError> {
        if entity_kind != EntityKind::TimerCard {
            return Ok(());
        }
        let window = context.timer_card.as_ref().ok_or_else(|| {
            ImportError::InvalidContext(
                "timer card import requires factory_id, year and month".to_string(),
            )
        })?;
        if window.factory_id.trim().is_empty() {
            return Err(ImportError::InvalidContext("factory_id is empty".to_string()));
        }
        if !(1..=12).contains(&window.month) {
            return Err(ImportError::InvalidContext(format!(
                "month out of range: {}",
                window.month
            )));
        }
        Ok(())
    }

    /// 单行: 映射 → 注入上下文 → 校验 → 冲突检测
    fn prepare_row(
        &self,
        raw: &RawRow,
        entity_kind: EntityKind,
        context: &ImportContext,
        validator: &RowValidator<'_>,
        conflicts: &mut ConflictHandler,
    ) -> Result<(NaturalKey, CanonicalRecord), RowError> {
        let mut record = self
            .field_mapper
            .map_row(raw, entity_kind, context.strict_headers)?;

        // 考勤行的工厂取自上下文，而非文件
        if let Some(window) = &context.timer_card {
            if entity_kind == EntityKind::TimerCard {
                record.insert("factory_id", FieldValue::Text(window.factory_id.clone()));
            }
        }

        let record = validator.validate(record)?;
        let key = record.natural_key().ok_or_else(|| {
            RowError::validation(raw.row_index, "natural_key", "natural key is incomplete")
        })?;
        conflicts.register(&key, raw.row_index)?;
        Ok((key, record))
    }

    /// 以调用方给定的批次执行取込（batch_id 用于日志与响应关联）
    #[instrument(skip(self, batch, file_path, context), fields(batch_id = %batch.batch_id))]
    pub async fn run(
        &self,
        batch: &ImportBatch,
        file_path: &Path,
        context: &ImportContext,
    ) -> Result<ImportSummary, ImportError> {
        let _perf = PerfGuard::new("import_batch");
        let start = Instant::now();
        let entity_kind = batch.entity_kind;

        Self::check_context(entity_kind, context)?;

        info!(
            batch_id = %batch.batch_id,
            file = %batch.source_file,
            entity_kind = %entity_kind,
            "开始取込"
        );

        // 步骤 1: 解码（批次级失败直接返回）
        let sheet = self.file_parser.open(file_path)?;
        debug!(headers = ?sheet.headers, "表头解析完成");

        // 步骤 2: 参照数据快照
        let snapshot = self.repo.load_reference_snapshot().await?;
        debug!(
            factories = snapshot.factory_ids.len(),
            apartments = snapshot.apartment_ids.len(),
            employees = snapshot.employee_ids.len(),
            "参照数据已加载"
        );

        let validator = RowValidator::new(&snapshot, context);
        let writer = PersistenceWriter::new(&self.repo);
        let mut conflicts = ConflictHandler::new();
        let mut aggregator = ResultAggregator::new();

        // 步骤 3: 逐行处理
        for decoded in sheet.rows {
            let outcome = match decoded {
                Err(e) => RowOutcome::Rejected {
                    row_index: e.row(),
                    reason: e.to_string(),
                },
                Ok(raw) => {
                    match self.prepare_row(&raw, entity_kind, context, &validator, &mut conflicts) {
                        Err(e) => RowOutcome::Rejected {
                            row_index: raw.row_index,
                            reason: e.to_string(),
                        },
                        Ok((key, record)) => match writer.write(&key, &record).await {
                            Ok(written) => RowOutcome::Accepted {
                                row_index: raw.row_index,
                                entity_id: written.entity_id,
                                was_update: written.was_update,
                            },
                            Err(e) => RowOutcome::Rejected {
                                row_index: raw.row_index,
                                reason: e.to_string(),
                            },
                        },
                    }
                }
            };

            match &outcome {
                RowOutcome::Rejected { row_index, reason } => {
                    warn!(row = row_index, reason = %reason, "行被拒绝");
                }
                RowOutcome::Accepted {
                    row_index,
                    entity_id,
                    was_update,
                } => {
                    debug!(row = row_index, entity_id, was_update, "行已写入");
                }
            }
            aggregator.record(outcome);

            if aggregator.recorded_rows() % YIELD_EVERY_ROWS == 0 {
                tokio::task::yield_now().await;
            }
        }

        // 步骤 4: 汇总
        let summary = aggregator.finish();
        info!(
            batch_id = %batch.batch_id,
            created = summary.created,
            updated = summary.updated,
            rejected = summary.rejected,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "取込完成"
        );

        Ok(summary)
    }
}

#[async_trait]
impl<R> TabularImporter for ImportPipeline<R>
where
    R: ImportRepository,
{
    async fn import(
        &self,
        file_path: &Path,
        entity_kind: EntityKind,
        context: &ImportContext,
    ) -> Result<ImportSummary, ImportError> {
        let batch = ImportBatch::new(file_path, entity_kind);
        self.run(&batch, file_path, context).await
    }
}
