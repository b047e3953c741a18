// ==========================================
// 人事取込バックエンド - 社员 / 考勤领域模型
// ==========================================
// 对齐: employees / timer_cards 表
// 用途: 取込层写入，读仓储返回
// ==========================================

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Employee - 派遣社员
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub hakenmoto_id: String, // 派遣元ID（自然键）

    // ===== 基本信息 =====
    pub full_name_kanji: String,
    pub full_name_kana: Option<String>,
    pub full_name_roman: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub nationality: Option<String>,

    // ===== 联系方式 =====
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub email: Option<String>,

    // ===== 在留 =====
    pub zairyu_card_number: Option<String>,
    pub zairyu_expire_date: Option<NaiveDate>,
    pub visa_type: Option<String>,

    // ===== 派遣 / 雇佣 =====
    pub factory_id: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub jikyu: Option<i64>, // 时给（円）
    pub position: Option<String>,
    pub contract_type: Option<String>,

    // ===== 宿舍 =====
    pub apartment_id: Option<i64>,
    pub apartment_rent: Option<i64>,

    pub photo_data_url: Option<String>,
    pub is_active: bool,
}

// ==========================================
// TimerCard - 考勤记录（社员 × 日付 唯一）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerCard {
    pub id: i64,
    pub employee_id: i64,
    pub hakenmoto_id: String,
    pub factory_id: String,
    pub work_date: NaiveDate,
    pub clock_in: Option<NaiveTime>,
    pub clock_out: Option<NaiveTime>,
    pub break_minutes: Option<i64>,
    pub notes: Option<String>,
}

impl TimerCard {
    /// 实际工作分钟数；退勤早于出勤视为跨日夜班
    pub fn worked_minutes(&self) -> Option<i64> {
        let (start, end) = (self.clock_in?, self.clock_out?);
        let mut minutes = (end - start).num_minutes();
        if minutes < 0 {
            minutes += 24 * 60;
        }
        Some((minutes - self.break_minutes.unwrap_or(0)).max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(clock_in: &str, clock_out: &str, break_minutes: Option<i64>) -> TimerCard {
        TimerCard {
            id: 1,
            employee_id: 1,
            hakenmoto_id: "1001".to_string(),
            factory_id: "F001".to_string(),
            work_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            clock_in: NaiveTime::parse_from_str(clock_in, "%H:%M").ok(),
            clock_out: NaiveTime::parse_from_str(clock_out, "%H:%M").ok(),
            break_minutes,
            notes: None,
        }
    }

    #[test]
    fn test_worked_minutes_day_shift() {
        assert_eq!(card("08:00", "17:00", Some(60)).worked_minutes(), Some(480));
    }

    #[test]
    fn test_worked_minutes_night_shift_crosses_midnight() {
        assert_eq!(card("20:00", "05:00", Some(60)).worked_minutes(), Some(480));
    }
}
