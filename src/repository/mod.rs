// ==========================================
// 人事取込バックエンド - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod employee_repo;
pub mod error;
pub mod factory_repo;
pub mod import_repo;
pub mod import_repo_impl;
pub mod timer_card_repo;

// 重导出核心仓储
pub use employee_repo::EmployeeRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use factory_repo::FactoryRepository;
pub use import_repo::{ImportRepository, UpsertOutcome};
pub use import_repo_impl::ImportRepositoryImpl;
pub use timer_card_repo::TimerCardRepository;
