// ==========================================
// 人事取込バックエンド - 取込 Repository 实现
// ==========================================
// 职责: 实现取込相关数据访问（使用 rusqlite）
// 事务: 每行一个事务（unchecked_transaction），失败只回滚本行
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::import::{CanonicalRecord, EntityId, NaturalKey, ReferenceSnapshot};
use crate::domain::types::EntityKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_repo::{ImportRepository, UpsertOutcome};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// employees 表中可由取込写入的列
const EMPLOYEE_COLUMNS: &[&str] = &[
    "hakenmoto_id",
    "full_name_kanji",
    "full_name_kana",
    "full_name_roman",
    "date_of_birth",
    "gender",
    "nationality",
    "postal_code",
    "address",
    "phone",
    "mobile_phone",
    "email",
    "zairyu_card_number",
    "zairyu_expire_date",
    "visa_type",
    "factory_id",
    "hire_date",
    "jikyu",
    "position",
    "contract_type",
    "apartment_id",
    "apartment_rent",
];

/// timer_cards 表中可由取込写入的列（employee_name 仅用于核对，不落库）
const TIMER_CARD_COLUMNS: &[&str] = &[
    "hakenmoto_id",
    "factory_id",
    "work_date",
    "clock_in",
    "clock_out",
    "break_minutes",
    "notes",
];

fn writable_columns(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Employee => EMPLOYEE_COLUMNS,
        EntityKind::TimerCard => TIMER_CARD_COLUMNS,
    }
}

/// 记录中可落库的 (列, 值)
fn column_values(record: &CanonicalRecord) -> Vec<(&'static str, Value)> {
    let columns = writable_columns(record.entity_kind);
    record
        .fields()
        .filter(|(name, _)| columns.contains(name))
        .map(|(name, value)| (name, Value::from(value)))
        .collect()
}

// ==========================================
// ImportRepositoryImpl
// ==========================================
pub struct ImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ImportRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 与其他仓储共享连接
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn find_tx(conn: &Connection, key: &NaturalKey) -> RepositoryResult<Option<EntityId>> {
        let id = match key {
            NaturalKey::Employee { hakenmoto_id } => conn
                .query_row(
                    "SELECT id FROM employees WHERE hakenmoto_id = ?1",
                    params![hakenmoto_id],
                    |row| row.get(0),
                )
                .optional()?,
            NaturalKey::TimerCard {
                hakenmoto_id,
                work_date,
            } => conn
                .query_row(
                    "SELECT id FROM timer_cards WHERE hakenmoto_id = ?1 AND work_date = ?2",
                    params![hakenmoto_id, work_date.format("%Y-%m-%d").to_string()],
                    |row| row.get(0),
                )
                .optional()?,
        };
        Ok(id)
    }

    /// 考勤行需要解析社员主键
    fn resolve_employee_id(conn: &Connection, hakenmoto_id: &str) -> RepositoryResult<EntityId> {
        conn.query_row(
            "SELECT id FROM employees WHERE hakenmoto_id = ?1",
            params![hakenmoto_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| {
            RepositoryError::ForeignKeyViolation(format!("employee not found: {}", hakenmoto_id))
        })
    }

    fn insert_tx(conn: &Connection, record: &CanonicalRecord) -> RepositoryResult<EntityId> {
        let mut pairs = column_values(record);

        if record.entity_kind == EntityKind::TimerCard {
            let hakenmoto_id = record.text("hakenmoto_id").ok_or_else(|| {
                RepositoryError::FieldValueError {
                    field: "hakenmoto_id".to_string(),
                    message: "missing".to_string(),
                }
            })?;
            let employee_id = Self::resolve_employee_id(conn, hakenmoto_id)?;
            pairs.push(("employee_id", Value::Integer(employee_id)));
        }

        let now = Utc::now().to_rfc3339();
        pairs.push(("created_at", Value::Text(now.clone())));
        pairs.push(("updated_at", Value::Text(now)));

        let columns: Vec<&str> = pairs.iter().map(|(c, _)| *c).collect();
        let placeholders: Vec<String> = (1..=pairs.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            record.entity_kind.table_name(),
            columns.join(", "),
            placeholders.join(", ")
        );

        conn.execute(&sql, params_from_iter(pairs.into_iter().map(|(_, v)| v)))?;
        Ok(conn.last_insert_rowid())
    }

    fn update_tx(conn: &Connection, id: EntityId, record: &CanonicalRecord) -> RepositoryResult<()> {
        let mut pairs = column_values(record);
        pairs.push(("updated_at", Value::Text(Utc::now().to_rfc3339())));

        let assignments: Vec<String> = pairs
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            record.entity_kind.table_name(),
            assignments.join(", "),
            pairs.len() + 1
        );

        let mut values: Vec<Value> = pairs.into_iter().map(|(_, v)| v).collect();
        values.push(Value::Integer(id));

        let affected = conn.execute(&sql, params_from_iter(values))?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: record.entity_kind.to_string(),
                key: format!("id={}", id),
            });
        }
        Ok(())
    }

    fn load_set<T>(conn: &Connection, sql: &str) -> RepositoryResult<HashSet<T>>
    where
        T: rusqlite::types::FromSql + std::hash::Hash + Eq,
    {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, T>(0))?;
        let mut set = HashSet::new();
        for value in rows {
            set.insert(value?);
        }
        Ok(set)
    }
}

#[async_trait]
impl ImportRepository for ImportRepositoryImpl {
    async fn load_reference_snapshot(&self) -> RepositoryResult<ReferenceSnapshot> {
        let conn = self.conn.lock()?;

        Ok(ReferenceSnapshot {
            factory_ids: Self::load_set(&conn, "SELECT factory_id FROM factories")?,
            apartment_ids: Self::load_set(&conn, "SELECT apartment_id FROM apartments")?,
            employee_ids: Self::load_set(&conn, "SELECT hakenmoto_id FROM employees")?,
        })
    }

    async fn factory_exists(&self, factory_id: &str) -> RepositoryResult<bool> {
        let conn = self.conn.lock()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM factories WHERE factory_id = ?1",
                params![factory_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    async fn apartment_exists(&self, apartment_id: i64) -> RepositoryResult<bool> {
        let conn = self.conn.lock()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM apartments WHERE apartment_id = ?1",
                params![apartment_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    async fn find_by_natural_key(&self, key: &NaturalKey) -> RepositoryResult<Option<EntityId>> {
        let conn = self.conn.lock()?;
        Self::find_tx(&conn, key)
    }

    async fn insert(&self, record: &CanonicalRecord) -> RepositoryResult<EntityId> {
        let conn = self.conn.lock()?;
        let tx = conn.unchecked_transaction()?;
        let id = Self::insert_tx(&tx, record)?;
        tx.commit()?;
        Ok(id)
    }

    async fn update(&self, id: EntityId, record: &CanonicalRecord) -> RepositoryResult<()> {
        let conn = self.conn.lock()?;
        let tx = conn.unchecked_transaction()?;
        Self::update_tx(&tx, id, record)?;
        tx.commit()?;
        Ok(())
    }

    async fn upsert(
        &self,
        key: &NaturalKey,
        record: &CanonicalRecord,
    ) -> RepositoryResult<UpsertOutcome> {
        let conn = self.conn.lock()?;
        let tx = conn.unchecked_transaction()?;

        let outcome = match Self::find_tx(&tx, key)? {
            Some(id) => {
                Self::update_tx(&tx, id, record)?;
                UpsertOutcome {
                    entity_id: id,
                    was_update: true,
                }
            }
            None => UpsertOutcome {
                entity_id: Self::insert_tx(&tx, record)?,
                was_update: false,
            },
        };

        // 未提交的事务在 drop 时回滚
        tx.commit()?;
        Ok(outcome)
    }
}
