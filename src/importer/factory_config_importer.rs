// ==========================================
// 人事取込バックエンド - 工厂配置取込
// ==========================================
// 来源: 目录内每个 *.json 一个工厂
// 约束: 单个文件失败只记录错误，不影响其他文件
// ==========================================

use crate::domain::factory::FactoryConfig;
use crate::importer::error::DecodeError;
use crate::repository::FactoryRepository;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactoryFileError {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FactoryImportSummary {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub errors: Vec<FactoryFileError>,
}

pub struct FactoryConfigImporter<'a> {
    repo: &'a FactoryRepository,
}

impl<'a> FactoryConfigImporter<'a> {
    pub fn new(repo: &'a FactoryRepository) -> Self {
        Self { repo }
    }

    /// 取込目录下全部工厂配置
    ///
    /// # 返回
    /// - Err: 目录不存在或不可读（批次级）
    pub fn import_dir(&self, dir: &Path) -> Result<FactoryImportSummary, DecodeError> {
        if !dir.is_dir() {
            return Err(DecodeError::FileNotFound(dir.display().to_string()));
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|e| e.to_str())
                        .map(|e| e.eq_ignore_ascii_case("json"))
                        .unwrap_or(false)
            })
            .collect();
        files.sort();

        info!(dir = %dir.display(), count = files.len(), "开始取込工厂配置");

        let mut summary = FactoryImportSummary::default();
        for path in files {
            let file = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match self.import_file(&path) {
                Ok(true) => summary.updated += 1,
                Ok(false) => summary.created += 1,
                Err(reason) => {
                    warn!(file = %file, reason = %reason, "工厂配置取込失败");
                    summary.failed += 1;
                    summary.errors.push(FactoryFileError { file, reason });
                }
            }
        }

        info!(
            created = summary.created,
            updated = summary.updated,
            failed = summary.failed,
            "工厂配置取込完成"
        );
        Ok(summary)
    }

    /// Ok(true) 表示更新
    fn import_file(&self, path: &Path) -> Result<bool, String> {
        let raw = std::fs::read_to_string(path).map_err(|e| format!("read failed: {}", e))?;
        let config: FactoryConfig =
            serde_json::from_str(&raw).map_err(|e| format!("invalid json: {}", e))?;
        config.validate()?;
        self.repo.upsert(&config).map_err(|e| e.to_string())
    }
}
