// ==========================================
// 人事取込バックエンド - 健康检查API
// ==========================================

use crate::db::read_schema_version;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// "healthy" | "unhealthy"
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub schema_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

pub struct HealthApi {
    conn: Arc<Mutex<Connection>>,
}

impl HealthApi {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 数据库可查询即视为 healthy
    pub fn check(&self) -> HealthStatus {
        let probe = self
            .conn
            .lock()
            .map_err(|e| e.to_string())
            .and_then(|conn| read_schema_version(&conn).map_err(|e| e.to_string()));

        match probe {
            Ok(schema_version) => HealthStatus {
                status: "healthy",
                timestamp: Utc::now(),
                schema_version,
                error: None,
            },
            Err(e) => {
                warn!(error = %e, "健康检查失败");
                HealthStatus {
                    status: "unhealthy",
                    timestamp: Utc::now(),
                    schema_version: None,
                    error: Some(e),
                }
            }
        }
    }
}
