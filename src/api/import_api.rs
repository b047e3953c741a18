// ==========================================
// 人事取込バックエンド - 取込API
// ==========================================
// 职责: 封装取込相关功能（HTTP 层 / CLI 共用）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::AppConfig;
use crate::db;
use crate::domain::import::{ImportBatch, ImportContext, ImportSummary};
use crate::domain::types::EntityKind;
use crate::importer::{
    templates, FactoryConfigImporter, FactoryImportSummary, ImportPipeline, UniversalFileParser,
};
use crate::perf;
use crate::repository::{FactoryRepository, ImportRepositoryImpl};
use futures::future::join_all;
use rusqlite::Connection;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{error, info};

/// 取込API响应
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    /// 批次ID（与日志关联）
    pub batch_id: String,
    pub entity_kind: EntityKind,
    #[serde(flatten)]
    pub summary: ImportSummary,
    /// 取込耗时（毫秒）
    pub elapsed_ms: u64,
}

/// 取込API
pub struct ImportApi {
    conn: Arc<Mutex<Connection>>,
    pipeline: ImportPipeline<ImportRepositoryImpl>,
    factory_repo: FactoryRepository,
    upload_dir: PathBuf,
    strict_headers: bool,
    timeout: Duration,
}

impl ImportApi {
    /// 按配置打开数据库（含迁移）并创建实例
    pub fn new(config: &AppConfig) -> ApiResult<Self> {
        let mut conn = db::open_sqlite_connection_with_timeout(
            &config.database.path,
            config.database.busy_timeout_ms,
        )?;
        perf::install_sqlite_tracing(&mut conn, config.slow_sql_ms);
        db::migrate(&conn)?;

        let api = Self::from_connection(Arc::new(Mutex::new(conn)), config);
        info!(
            database = %config.database.path,
            upload_dir = %api.upload_dir.display(),
            "ImportApi 初始化完成"
        );
        Ok(api)
    }

    /// 使用已迁移的共享连接创建实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>, config: &AppConfig) -> Self {
        Self {
            pipeline: ImportPipeline::new(ImportRepositoryImpl::from_connection(conn.clone())),
            factory_repo: FactoryRepository::from_connection(conn.clone()),
            conn,
            upload_dir: config.upload_dir.clone(),
            strict_headers: config.strict_headers,
            timeout: config.import_timeout,
        }
    }

    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    /// 取込社员台账
    pub async fn import_employees(&self, file_path: &Path) -> ApiResult<ImportReport> {
        let context = ImportContext::employees().with_strict_headers(self.strict_headers);
        self.import_file(file_path, EntityKind::Employee, &context).await
    }

    /// 取込某工厂某月的考勤
    pub async fn import_timer_cards(
        &self,
        file_path: &Path,
        factory_id: &str,
        year: i32,
        month: u32,
    ) -> ApiResult<ImportReport> {
        if factory_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("factory_id is required".to_string()));
        }
        if !(1..=12).contains(&month) {
            return Err(ApiError::InvalidInput(format!("month out of range: {}", month)));
        }
        let context = ImportContext::timer_cards(factory_id.trim(), year, month)
            .with_strict_headers(self.strict_headers);
        self.import_file(file_path, EntityKind::TimerCard, &context).await
    }

    /// 取込已落地的文件
    ///
    /// # 返回
    /// - Err(InvalidInput): 扩展名不受支持
    /// - Err(Timeout): 超过 IMPORT_TIMEOUT_SECS
    /// - Err(Import): 批次级失败
    pub async fn import_file(
        &self,
        file_path: &Path,
        entity_kind: EntityKind,
        context: &ImportContext,
    ) -> ApiResult<ImportReport> {
        let file_name = file_path.display().to_string();
        if !UniversalFileParser::is_supported(&file_name) {
            return Err(ApiError::InvalidInput(format!(
                "unsupported file type: {} (expected .xlsx/.xls/.xlsm/.ods/.csv)",
                file_name
            )));
        }

        let start = Instant::now();
        let batch = ImportBatch::new(file_path, entity_kind);

        let summary = tokio::time::timeout(self.timeout, self.pipeline.run(&batch, file_path, context))
            .await
            .map_err(|_| {
                error!(batch_id = %batch.batch_id, "取込超时");
                ApiError::Timeout(self.timeout.as_secs())
            })??;

        Ok(ImportReport {
            batch_id: batch.batch_id,
            entity_kind,
            summary,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// 取込上传内容
    ///
    /// 内容先写入 <UPLOAD_DIR>/import_temp 下的临时文件，结束后（无论成败）删除
    pub async fn import_upload(
        &self,
        file_name: &str,
        content: &[u8],
        entity_kind: EntityKind,
        context: &ImportContext,
    ) -> ApiResult<ImportReport> {
        if !UniversalFileParser::is_supported(file_name) {
            return Err(ApiError::InvalidInput(format!(
                "unsupported file type: {}",
                file_name
            )));
        }
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        std::fs::create_dir_all(&self.upload_dir)?;
        let mut temp = tempfile::Builder::new()
            .prefix("upload_")
            .suffix(&format!(".{}", extension))
            .tempfile_in(&self.upload_dir)?;
        temp.write_all(content)?;
        temp.flush()?;

        info!(file = %file_name, bytes = content.len(), temp = %temp.path().display(), "上传文件已落地");

        // temp drop 时删除文件
        self.import_file(temp.path(), entity_kind, context).await
    }

    /// 批量取込多个文件（并发执行）
    pub async fn batch_import(
        &self,
        file_paths: Vec<PathBuf>,
        entity_kind: EntityKind,
        context: &ImportContext,
    ) -> Vec<ApiResult<ImportReport>> {
        info!(count = file_paths.len(), "开始批量取込");

        let tasks = file_paths.iter().map(|path| async move {
            let result = self.import_file(path, entity_kind, context).await;
            if let Err(e) = &result {
                error!(file = %path.display(), error = %e, "文件取込失败");
            }
            result
        });
        let results = join_all(tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量取込完成"
        );
        results
    }

    /// 取込目录下的工厂配置 JSON
    pub async fn import_factory_configs(&self, dir: &Path) -> ApiResult<FactoryImportSummary> {
        let summary = FactoryConfigImporter::new(&self.factory_repo).import_dir(dir)?;
        Ok(summary)
    }

    /// 取込模板的列名
    pub fn template(&self, entity_kind: EntityKind) -> Vec<String> {
        templates::template_columns(entity_kind)
    }

    pub fn write_template(&self, entity_kind: EntityKind, path: &Path) -> ApiResult<()> {
        templates::write_csv_template(path, entity_kind)?;
        Ok(())
    }
}
