// ==========================================
// 人事取込バックエンド - 取込层
// ==========================================
// 职责: 外部表格文件取込为社员 / 考勤记录
// 支持: Excel, CSV；工厂配置 JSON
// ==========================================

// 模块声明
pub mod aggregator;
pub mod conflict_handler;
pub mod error;
pub mod factory_config_importer;
pub mod field_mapper;
pub mod file_parser;
pub mod header_dictionary;
pub mod importer_trait;
pub mod persistence_writer;
pub mod pipeline;
pub mod row_validator;
pub mod templates;

// 重导出核心类型
pub use aggregator::ResultAggregator;
pub use conflict_handler::ConflictHandler;
pub use error::{DecodeError, ImportError, ImportResult, RowError};
pub use factory_config_importer::{FactoryConfigImporter, FactoryFileError, FactoryImportSummary};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use persistence_writer::PersistenceWriter;
pub use pipeline::ImportPipeline;
pub use row_validator::RowValidator;

// 重导出 Trait 接口
pub use importer_trait::{DecodedSheet, FileParser, RowStream, TabularImporter};
