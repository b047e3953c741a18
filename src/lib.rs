// ==========================================
// 人事取込バックエンド - 核心库
// ==========================================
// 技术栈: Rust + SQLite (rusqlite) + calamine/csv
// 系统定位: 派遣社员台账 / 考勤的表格取込
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 取込层 - 外部数据
pub mod importer;

// 配置层 - 启动配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/迁移）
pub mod db;

// 日志系统
pub mod logging;

// SQL 计数与慢查询
pub mod perf;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EntityKind, Gender, VisaType};

// 取込数据结构
pub use domain::{
    CanonicalRecord, Employee, FactoryConfig, ImportContext, ImportSummary, RawRow, RowOutcome,
    TimerCard,
};

// 取込
pub use importer::{ImportPipeline, TabularImporter};

// API
pub use api::{HealthApi, ImportApi, ImportReport};

// 配置
pub use config::AppConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "人事取込バックエンド";
