// ==========================================
// 人事取込バックエンド - API层
// ==========================================
// 职责: 对外业务接口（HTTP 层与 CLI 的共同入口）
// ==========================================

pub mod error;
pub mod health_api;
pub mod import_api;

pub use error::{ApiError, ApiResult};
pub use health_api::{HealthApi, HealthStatus};
pub use import_api::{ImportApi, ImportReport};
