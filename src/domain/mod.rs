// ==========================================
// 人事取込バックエンド - 领域模型层
// ==========================================
// 职责: 定义实体、取込数据结构、枚举
// 红线: 不含数据访问逻辑
// ==========================================

pub mod employee;
pub mod factory;
pub mod import;
pub mod types;

// 重导出核心类型
pub use employee::{Employee, TimerCard};
pub use factory::FactoryConfig;
pub use import::{
    CanonicalRecord, CellValue, EntityId, FieldValue, ImportBatch, ImportContext, ImportSummary,
    NaturalKey, RawRow, ReferenceSnapshot, RowErrorEntry, RowOutcome, TimerCardWindow,
};
pub use types::{EntityKind, Gender, VisaType};
