// ==========================================
// 人事取込バックエンド - 行校验器实现
// ==========================================
// 职责: 必填 / 参照 / 业务规则校验
// 约束: 只读参照快照，无副作用；通过则原样返回记录
// ==========================================

use crate::domain::import::{CanonicalRecord, ImportContext, ReferenceSnapshot};
use crate::domain::types::EntityKind;
use crate::importer::error::RowError;
use crate::importer::header_dictionary;

pub struct RowValidator<'a> {
    snapshot: &'a ReferenceSnapshot,
    context: &'a ImportContext,
}

impl<'a> RowValidator<'a> {
    pub fn new(snapshot: &'a ReferenceSnapshot, context: &'a ImportContext) -> Self {
        Self { snapshot, context }
    }

    pub fn validate(&self, record: CanonicalRecord) -> Result<CanonicalRecord, RowError> {
        self.validate_required_fields(&record)?;
        match record.entity_kind {
            EntityKind::Employee => self.validate_employee(&record)?,
            EntityKind::TimerCard => self.validate_timer_card(&record)?,
        }
        Ok(record)
    }

    /// 必填字段（按声明顺序报告第一个缺失项）
    fn validate_required_fields(&self, record: &CanonicalRecord) -> Result<(), RowError> {
        let missing = header_dictionary::fields_for(record.entity_kind)
            .iter()
            .filter(|spec| spec.required)
            .find(|spec| match record.text(spec.canonical) {
                Some(text) => text.trim().is_empty(),
                None => !record.contains(spec.canonical),
            });

        match missing {
            Some(spec) => Err(RowError::validation(
                record.row_index,
                spec.canonical,
                format!("missing required field: {}", spec.canonical),
            )),
            None => Ok(()),
        }
    }

    fn validate_employee(&self, record: &CanonicalRecord) -> Result<(), RowError> {
        let row = record.row_index;

        if let Some(factory_id) = record.text("factory_id") {
            if !self.snapshot.factory_exists(factory_id) {
                return Err(RowError::validation(
                    row,
                    "factory_id",
                    format!("unknown factory: {}", factory_id),
                ));
            }
        }

        if let Some(apartment_id) = record.integer("apartment_id") {
            if !self.snapshot.apartment_exists(apartment_id) {
                return Err(RowError::validation(
                    row,
                    "apartment_id",
                    format!("unknown apartment: {}", apartment_id),
                ));
            }
        }

        if let Some(email) = record.text("email") {
            if !is_plausible_email(email) {
                return Err(RowError::validation(
                    row,
                    "email",
                    format!("invalid email address: {}", email),
                ));
            }
        }

        if let Some(dob) = record.date("date_of_birth") {
            if dob > self.context.batch_date {
                return Err(RowError::validation(
                    row,
                    "date_of_birth",
                    format!("date_of_birth is in the future: {}", dob),
                ));
            }
        }

        for field in ["jikyu", "apartment_rent"] {
            if let Some(amount) = record.integer(field) {
                if amount < 0 {
                    return Err(RowError::validation(
                        row,
                        field,
                        format!("{} must not be negative: {}", field, amount),
                    ));
                }
            }
        }

        Ok(())
    }

    fn validate_timer_card(&self, record: &CanonicalRecord) -> Result<(), RowError> {
        let row = record.row_index;

        // 上下文由管道入口保证存在
        let window = match &self.context.timer_card {
            Some(window) => window,
            None => {
                return Err(RowError::validation(
                    row,
                    "work_date",
                    "timer card import requires factory, year and month",
                ))
            }
        };

        if !self.snapshot.factory_exists(&window.factory_id) {
            return Err(RowError::validation(
                row,
                "factory_id",
                format!("unknown factory: {}", window.factory_id),
            ));
        }

        if let Some(work_date) = record.date("work_date") {
            if !window.contains(work_date) {
                return Err(RowError::validation(
                    row,
                    "work_date",
                    format!(
                        "work_date {} is outside {:04}-{:02}",
                        work_date, window.year, window.month
                    ),
                ));
            }
        }

        if let Some(hakenmoto_id) = record.text("hakenmoto_id") {
            if !self.snapshot.employee_exists(hakenmoto_id) {
                return Err(RowError::validation(
                    row,
                    "hakenmoto_id",
                    format!("unknown employee: {}", hakenmoto_id),
                ));
            }
        }

        if let Some(minutes) = record.integer("break_minutes") {
            if minutes < 0 {
                return Err(RowError::validation(
                    row,
                    "break_minutes",
                    format!("break_minutes must not be negative: {}", minutes),
                ));
            }
        }

        Ok(())
    }
}

/// local@domain，两部分非空且只有一个 @
fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => !local.is_empty() && !domain.is_empty(),
        _ => false,
    }
}
