use crate::db::open_sqlite_connection;
use crate::domain::employee::Employee;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// EmployeeRepository - 社员读仓储
// ==========================================
/// 职责: employees 表查询（写入统一走取込管道）
pub struct EmployeeRepository {
    conn: Arc<Mutex<Connection>>,
}

const EMPLOYEE_SELECT: &str = r#"
    SELECT
        id, hakenmoto_id, full_name_kanji, full_name_kana, full_name_roman,
        date_of_birth, gender, nationality, postal_code, address, phone,
        mobile_phone, email, zairyu_card_number, zairyu_expire_date, visa_type,
        factory_id, hire_date, jikyu, position, contract_type, apartment_id,
        apartment_rent, photo_data_url, is_active
    FROM employees
"#;

fn parse_date(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

fn map_employee(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        hakenmoto_id: row.get(1)?,
        full_name_kanji: row.get(2)?,
        full_name_kana: row.get(3)?,
        full_name_roman: row.get(4)?,
        date_of_birth: parse_date(row.get(5)?),
        gender: row.get(6)?,
        nationality: row.get(7)?,
        postal_code: row.get(8)?,
        address: row.get(9)?,
        phone: row.get(10)?,
        mobile_phone: row.get(11)?,
        email: row.get(12)?,
        zairyu_card_number: row.get(13)?,
        zairyu_expire_date: parse_date(row.get(14)?),
        visa_type: row.get(15)?,
        factory_id: row.get(16)?,
        hire_date: parse_date(row.get(17)?),
        jikyu: row.get(18)?,
        position: row.get(19)?,
        contract_type: row.get(20)?,
        apartment_id: row.get(21)?,
        apartment_rent: row.get(22)?,
        photo_data_url: row.get(23)?,
        is_active: row.get::<_, i64>(24)? != 0,
    })
}

impl EmployeeRepository {
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

    /// 按派遣元ID查询
    ///
    /// # 返回
    /// - Ok(None): 未登记
    pub fn find_by_hakenmoto_id(&self, hakenmoto_id: &str) -> RepositoryResult<Option<Employee>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE hakenmoto_id = ?1", EMPLOYEE_SELECT);
        let result = conn.query_row(&sql, params![hakenmoto_id], map_employee);

        match result {
            Ok(employee) => Ok(Some(employee)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 某派遣先的在籍社员
    pub fn list_by_factory(&self, factory_id: &str) -> RepositoryResult<Vec<Employee>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE factory_id = ?1 AND is_active = 1 ORDER BY hakenmoto_id",
            EMPLOYEE_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let employees = stmt
            .query_map(params![factory_id], map_employee)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(employees)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?;
        Ok(count)
    }
}
