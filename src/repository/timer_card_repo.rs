use crate::db::open_sqlite_connection;
use crate::domain::employee::TimerCard;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// TimerCardRepository - 考勤读仓储
// ==========================================
pub struct TimerCardRepository {
    conn: Arc<Mutex<Connection>>,
}

fn parse_time(value: Option<String>) -> Option<NaiveTime> {
    value.and_then(|s| NaiveTime::parse_from_str(&s, "%H:%M:%S").ok())
}

fn map_timer_card(row: &Row<'_>) -> rusqlite::Result<TimerCard> {
    let work_date: String = row.get(4)?;
    Ok(TimerCard {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        hakenmoto_id: row.get(2)?,
        factory_id: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        work_date: NaiveDate::parse_from_str(&work_date, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?,
        clock_in: parse_time(row.get(5)?),
        clock_out: parse_time(row.get(6)?),
        break_minutes: row.get(7)?,
        notes: row.get(8)?,
    })
}

impl TimerCardRepository {
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

    /// 某工厂某月的考勤（按日付、派遣元ID排序）
    ///
    /// # 参数
    /// - month: 1..=12，超出范围返回 FieldValueError
    pub fn list_for_month(
        &self,
        factory_id: &str,
        year: i32,
        month: u32,
    ) -> RepositoryResult<Vec<TimerCard>> {
        let invalid_month = || RepositoryError::FieldValueError {
            field: "month".to_string(),
            message: format!("{}-{}", year, month),
        };
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid_month)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid_month)?;

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, employee_id, hakenmoto_id, factory_id, work_date,
                   clock_in, clock_out, break_minutes, notes
            FROM timer_cards
            WHERE factory_id = ?1 AND work_date >= ?2 AND work_date < ?3
            ORDER BY work_date, hakenmoto_id
            "#,
        )?;

        let cards = stmt
            .query_map(
                params![factory_id, first.to_string(), next.to_string()],
                map_timer_card,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate;

    fn repo() -> TimerCardRepository {
        let conn = open_sqlite_connection(":memory:").unwrap();
        migrate(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO factories (factory_id, name, created_at, updated_at) VALUES ('F001', '岡山工場', 'now', 'now');
            INSERT INTO employees (hakenmoto_id, full_name_kanji, created_at, updated_at) VALUES ('1001', '山田 太郎', 'now', 'now');
            INSERT INTO timer_cards (employee_id, hakenmoto_id, factory_id, work_date, clock_in, clock_out, break_minutes, created_at, updated_at)
                VALUES (1, '1001', 'F001', '2025-10-02', '08:00:00', '17:00:00', 60, 'now', 'now');
            INSERT INTO timer_cards (employee_id, hakenmoto_id, factory_id, work_date, created_at, updated_at)
                VALUES (1, '1001', 'F001', '2025-10-01', 'now', 'now');
            INSERT INTO timer_cards (employee_id, hakenmoto_id, factory_id, work_date, created_at, updated_at)
                VALUES (1, '1001', 'F001', '2025-11-01', 'now', 'now');
            "#,
        )
        .unwrap();
        TimerCardRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_list_for_month_filters_and_orders() {
        let repo = repo();

        let cards = repo.list_for_month("F001", 2025, 10).unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].work_date, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        assert_eq!(cards[1].worked_minutes(), Some(480));
    }

    #[test]
    fn test_list_for_december_and_bad_month() {
        let repo = repo();
        assert!(repo.list_for_month("F001", 2025, 12).unwrap().is_empty());
        assert!(repo.list_for_month("F001", 2025, 13).is_err());
    }
}
