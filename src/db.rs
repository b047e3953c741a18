// ==========================================
// 人事取込バックエンド - SQLite 连接初始化 + 迁移
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 / busy_timeout）
// - 版本化 schema 迁移，记录于 schema_version 表
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;
use tracing::info;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version（与 MIGRATIONS 末项对齐）
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

// ==========================================
// 迁移定义
// ==========================================
struct Migration {
    version: i64,
    name: &'static str,
    up: &'static str,
    down: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "base_schema",
        up: r#"
            CREATE TABLE factories (
                factory_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                address TEXT,
                phone TEXT,
                contact_person TEXT,
                config_json TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE apartments (
                apartment_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                address TEXT,
                monthly_rent INTEGER
            );

            CREATE TABLE employees (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                hakenmoto_id TEXT NOT NULL UNIQUE,
                full_name_kanji TEXT NOT NULL,
                full_name_kana TEXT,
                full_name_roman TEXT,
                date_of_birth TEXT,
                gender TEXT,
                nationality TEXT,
                postal_code TEXT,
                address TEXT,
                phone TEXT,
                mobile_phone TEXT,
                email TEXT,
                zairyu_card_number TEXT,
                zairyu_expire_date TEXT,
                visa_type TEXT,
                factory_id TEXT REFERENCES factories(factory_id),
                hire_date TEXT,
                jikyu INTEGER,
                position TEXT,
                contract_type TEXT,
                apartment_id INTEGER REFERENCES apartments(apartment_id),
                apartment_rent INTEGER,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE timer_cards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                employee_id INTEGER NOT NULL REFERENCES employees(id),
                hakenmoto_id TEXT NOT NULL,
                factory_id TEXT REFERENCES factories(factory_id),
                work_date TEXT NOT NULL,
                clock_in TEXT,
                clock_out TEXT,
                break_minutes INTEGER,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (hakenmoto_id, work_date)
            );

            CREATE INDEX idx_timer_cards_factory_date ON timer_cards(factory_id, work_date);
        "#,
        down: r#"
            DROP INDEX IF EXISTS idx_timer_cards_factory_date;
            DROP TABLE IF EXISTS timer_cards;
            DROP TABLE IF EXISTS employees;
            DROP TABLE IF EXISTS apartments;
            DROP TABLE IF EXISTS factories;
        "#,
    },
    Migration {
        version: 2,
        name: "employee_photo",
        up: "ALTER TABLE employees ADD COLUMN photo_data_url TEXT;",
        down: "ALTER TABLE employees DROP COLUMN photo_data_url;",
    },
];

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection, busy_timeout_ms: u64) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    open_sqlite_connection_with_timeout(db_path, DEFAULT_BUSY_TIMEOUT_MS)
}

pub fn open_sqlite_connection_with_timeout(
    db_path: &str,
    busy_timeout_ms: u64,
) -> rusqlite::Result<Connection> {
    let conn = if db_path == ":memory:" {
        Connection::open_in_memory()?
    } else {
        Connection::open(db_path)?
    };
    configure_sqlite_connection(&conn, busy_timeout_ms)?;
    Ok(conn)
}

fn ensure_version_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        );",
    )
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 按版本顺序应用未执行的迁移；重复调用无副作用
///
/// # 返回
/// 本次新应用的迁移数量
pub fn migrate(conn: &Connection) -> rusqlite::Result<usize> {
    ensure_version_table(conn)?;
    let current = read_schema_version(conn)?.unwrap_or(0);
    let mut applied = 0;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.up)?;
        tx.execute(
            "INSERT INTO schema_version (version, name, applied_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                migration.version,
                migration.name,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;

        info!(version = migration.version, name = migration.name, "schema 迁移已应用");
        applied += 1;
    }

    Ok(applied)
}

/// 逆序执行 down 迁移，直到 schema_version == target
pub fn rollback_to(conn: &Connection, target: i64) -> rusqlite::Result<usize> {
    ensure_version_table(conn)?;
    let current = read_schema_version(conn)?.unwrap_or(0);
    let mut reverted = 0;

    for migration in MIGRATIONS
        .iter()
        .rev()
        .filter(|m| m.version > target && m.version <= current)
    {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.down)?;
        tx.execute(
            "DELETE FROM schema_version WHERE version = ?1",
            [migration.version],
        )?;
        tx.commit()?;

        info!(version = migration.version, name = migration.name, "schema 迁移已回滚");
        reverted += 1;
    }

    Ok(reverted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({})", table))
            .unwrap();
        let names: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        names.iter().any(|n| n == column)
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = open_sqlite_connection(":memory:").unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);

        assert_eq!(migrate(&conn).unwrap(), 2);
        assert_eq!(migrate(&conn).unwrap(), 0);
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
        assert!(column_exists(&conn, "employees", "photo_data_url"));
    }

    #[test]
    fn test_rollback_and_reapply() {
        let conn = open_sqlite_connection(":memory:").unwrap();
        migrate(&conn).unwrap();

        assert_eq!(rollback_to(&conn, 1).unwrap(), 1);
        assert_eq!(read_schema_version(&conn).unwrap(), Some(1));
        assert!(!column_exists(&conn, "employees", "photo_data_url"));

        assert_eq!(migrate(&conn).unwrap(), 1);
        assert!(column_exists(&conn, "employees", "photo_data_url"));
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = open_sqlite_connection(":memory:").unwrap();
        let on: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(on, 1);
    }
}
