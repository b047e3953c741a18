use crate::db::open_sqlite_connection;
use crate::domain::factory::FactoryConfig;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// FactoryRepository - 派遣先工厂仓储
// ==========================================
/// 职责: factories 表 upsert / 查询
/// config_json 保存整份配置原文
pub struct FactoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FactoryRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入工厂配置
    ///
    /// # 返回
    /// - Ok(true): 已存在并更新
    /// - Ok(false): 新建
    pub fn upsert(&self, config: &FactoryConfig) -> RepositoryResult<bool> {
        let config_json =
            serde_json::to_string(config).map_err(|e| RepositoryError::FieldValueError {
                field: "config_json".to_string(),
                message: e.to_string(),
            })?;
        let now = Utc::now().to_rfc3339();

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM factories WHERE factory_id = ?1",
                params![config.factory_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .is_some();

        if exists {
            tx.execute(
                r#"
                UPDATE factories
                SET name = ?2, address = ?3, phone = ?4, contact_person = ?5,
                    config_json = ?6, updated_at = ?7
                WHERE factory_id = ?1
                "#,
                params![
                    config.factory_id,
                    config.name,
                    config.address,
                    config.phone,
                    config.contact_person,
                    config_json,
                    now,
                ],
            )?;
        } else {
            tx.execute(
                r#"
                INSERT INTO factories (
                    factory_id, name, address, phone, contact_person,
                    config_json, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
                "#,
                params![
                    config.factory_id,
                    config.name,
                    config.address,
                    config.phone,
                    config.contact_person,
                    config_json,
                    now,
                ],
            )?;
        }

        tx.commit()?;
        Ok(exists)
    }

    pub fn find_by_id(&self, factory_id: &str) -> RepositoryResult<Option<FactoryConfig>> {
        let conn = self.get_conn()?;
        let raw: Option<Option<String>> = conn
            .query_row(
                "SELECT config_json FROM factories WHERE factory_id = ?1",
                params![factory_id],
                |row| row.get(0),
            )
            .optional()?;

        match raw.flatten() {
            Some(json) => serde_json::from_str(&json).map(Some).map_err(|e| {
                RepositoryError::FieldValueError {
                    field: "config_json".to_string(),
                    message: e.to_string(),
                }
            }),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate;

    fn config(name: &str) -> FactoryConfig {
        serde_json::from_value(serde_json::json!({
            "factory_id": "F001",
            "name": name,
            "hourly_rate": 1650
        }))
        .unwrap()
    }

    #[test]
    fn test_upsert_create_then_update() {
        let conn = open_sqlite_connection(":memory:").unwrap();
        migrate(&conn).unwrap();
        let repo = FactoryRepository::from_connection(Arc::new(Mutex::new(conn)));

        assert!(!repo.upsert(&config("岡山工場")).unwrap());
        assert!(repo.upsert(&config("岡山第二工場")).unwrap());

        let stored = repo.find_by_id("F001").unwrap().unwrap();
        assert_eq!(stored.name, "岡山第二工場");
        assert_eq!(stored.extra["hourly_rate"], 1650);
        assert!(repo.find_by_id("F404").unwrap().is_none());
    }
}
