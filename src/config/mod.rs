// ==========================================
// 人事取込バックエンド - 配置层
// ==========================================
// 职责: 启动配置（环境变量）
// ==========================================

pub mod app_config;

pub use app_config::{
    env_keys, AppConfig, ConfigError, DatabaseConfig, LogFormat, VisionConfig,
};
