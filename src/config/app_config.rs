// ==========================================
// 人事取込バックエンド - 应用配置
// ==========================================
// 职责: 启动时从环境变量构建一次，之后按引用传递
// 红线: 凭证不设默认值；Debug 输出不含密钥
// ==========================================

use crate::db::DEFAULT_BUSY_TIMEOUT_MS;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_IMPORT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_SLOW_SQL_MS: u64 = 200;
pub const DEFAULT_VISION_API_VERSION: &str = "2023-02-01-preview";

/// 上传临时文件子目录
pub const UPLOAD_TEMP_SUBDIR: &str = "import_temp";

// 配置键
pub mod env_keys {
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const DATABASE_BUSY_TIMEOUT_MS: &str = "DATABASE_BUSY_TIMEOUT_MS";
    pub const UPLOAD_DIR: &str = "UPLOAD_DIR";
    pub const IMPORT_STRICT_HEADERS: &str = "IMPORT_STRICT_HEADERS";
    pub const IMPORT_TIMEOUT_SECS: &str = "IMPORT_TIMEOUT_SECS";
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    pub const SLOW_SQL_MS: &str = "SLOW_SQL_MS";
    pub const VISION_ENDPOINT: &str = "AZURE_COMPUTER_VISION_ENDPOINT";
    pub const VISION_KEY: &str = "AZURE_COMPUTER_VISION_KEY";
    pub const VISION_API_VERSION: &str = "AZURE_COMPUTER_VISION_API_VERSION";
    pub const VISION_REQUIRED: &str = "VISION_REQUIRED";
}

// ==========================================
// ConfigError
// ==========================================
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("incomplete settings: {0}")]
    Incomplete(String),
}

// ==========================================
// 配置结构
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// SQLite 文件路径或 ":memory:"
    pub path: String,
    pub busy_timeout_ms: u64,
}

#[derive(Clone, PartialEq, Eq)]
pub struct VisionConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
}

impl fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub upload_dir: PathBuf,
    pub strict_headers: bool,
    pub import_timeout: Duration,
    pub log_format: LogFormat,
    pub slow_sql_ms: u64,
    /// 未配置凭证时为 None（照片识别功能不可用）
    pub vision: Option<VisionConfig>,
}

impl AppConfig {
    /// 从进程环境变量读取
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取（测试使用闭包注入）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get(env_keys::DATABASE_URL).ok_or(ConfigError::Missing(env_keys::DATABASE_URL))?;
        let database = DatabaseConfig {
            path: parse_database_url(&database_url)?,
            busy_timeout_ms: parse_u64(
                env_keys::DATABASE_BUSY_TIMEOUT_MS,
                get(env_keys::DATABASE_BUSY_TIMEOUT_MS),
                DEFAULT_BUSY_TIMEOUT_MS,
            )?,
        };

        let upload_dir = get(env_keys::UPLOAD_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_upload_dir)
            .join(UPLOAD_TEMP_SUBDIR);

        let log_format = match get(env_keys::LOG_FORMAT).map(|v| v.to_lowercase()) {
            None => LogFormat::Text,
            Some(v) if v == "text" => LogFormat::Text,
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    key: env_keys::LOG_FORMAT,
                    value: v,
                })
            }
        };

        let vision_required = parse_bool(
            env_keys::VISION_REQUIRED,
            get(env_keys::VISION_REQUIRED),
            false,
        )?;
        let vision = match (get(env_keys::VISION_ENDPOINT), get(env_keys::VISION_KEY)) {
            (Some(endpoint), Some(api_key)) => Some(VisionConfig {
                endpoint,
                api_key,
                api_version: get(env_keys::VISION_API_VERSION)
                    .unwrap_or_else(|| DEFAULT_VISION_API_VERSION.to_string()),
            }),
            (None, None) if vision_required => {
                return Err(ConfigError::Missing(env_keys::VISION_ENDPOINT))
            }
            (None, None) => {
                tracing::info!("未配置照片识别凭证，相关功能不可用");
                None
            }
            (Some(_), None) => {
                return Err(ConfigError::Incomplete(format!(
                    "{} is set but {} is missing",
                    env_keys::VISION_ENDPOINT,
                    env_keys::VISION_KEY
                )))
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete(format!(
                    "{} is set but {} is missing",
                    env_keys::VISION_KEY,
                    env_keys::VISION_ENDPOINT
                )))
            }
        };

        Ok(Self {
            database,
            upload_dir,
            strict_headers: parse_bool(
                env_keys::IMPORT_STRICT_HEADERS,
                get(env_keys::IMPORT_STRICT_HEADERS),
                false,
            )?,
            import_timeout: Duration::from_secs(parse_u64(
                env_keys::IMPORT_TIMEOUT_SECS,
                get(env_keys::IMPORT_TIMEOUT_SECS),
                DEFAULT_IMPORT_TIMEOUT_SECS,
            )?),
            log_format,
            slow_sql_ms: parse_u64(
                env_keys::SLOW_SQL_MS,
                get(env_keys::SLOW_SQL_MS),
                DEFAULT_SLOW_SQL_MS,
            )?,
            vision,
        })
    }
}

/// sqlite://path | sqlite::memory: | 纯路径
fn parse_database_url(url: &str) -> Result<String, ConfigError> {
    if url == "sqlite::memory:" || url == ":memory:" {
        return Ok(":memory:".to_string());
    }
    if let Some(path) = url.strip_prefix("sqlite://") {
        if path.is_empty() {
            return Err(ConfigError::Invalid {
                key: env_keys::DATABASE_URL,
                value: url.to_string(),
            });
        }
        return Ok(path.to_string());
    }
    if url.contains("://") {
        // 仅支持 SQLite
        return Err(ConfigError::Invalid {
            key: env_keys::DATABASE_URL,
            value: url.to_string(),
        });
    }
    Ok(url.to_string())
}

fn parse_u64(key: &'static str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.parse::<u64>().map_err(|_| ConfigError::Invalid { key, value: v }),
    }
}

fn parse_bool(key: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => match v.to_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Ok(true),
            "0" | "false" | "no" | "n" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value: v }),
        },
    }
}

fn default_upload_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("hr-import"))
        .unwrap_or_else(|| PathBuf::from("./uploads"))
}
