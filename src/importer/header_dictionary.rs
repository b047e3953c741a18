// ==========================================
// 人事取込バックエンド - 表头字典
// ==========================================
// 职责: 本地化表头 → 标准字段名 + 字段类型（按实体种类声明）
// 约束: 新增列/别名只改此表，不改管道逻辑
// ==========================================

use crate::domain::types::EntityKind;

/// 枚举字段的取值集合
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKind {
    Gender,
    VisaType,
}

/// 字段类型（决定类型转换规则）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Date,
    Time,
    Enum(EnumKind),
}

/// 单个字段声明
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub canonical: &'static str,
    /// 可识别的表头（首个为模板标准列名）
    pub headers: &'static [&'static str],
    pub field_type: FieldType,
    pub required: bool,
}

impl FieldSpec {
    const fn new(
        canonical: &'static str,
        headers: &'static [&'static str],
        field_type: FieldType,
        required: bool,
    ) -> Self {
        Self {
            canonical,
            headers,
            field_type,
            required,
        }
    }

    pub fn template_header(&self) -> &'static str {
        self.headers[0]
    }

    pub fn matches(&self, header: &str) -> bool {
        let header = header.trim();
        self.headers.iter().any(|h| *h == header)
    }
}

use FieldType::*;

// ==========================================
// 社员表头
// ==========================================
const EMPLOYEE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("hakenmoto_id", &["派遣元ID", "社員ID", "社員番号"], Text, true),
    FieldSpec::new("full_name_kanji", &["氏名", "名前"], Text, true),
    FieldSpec::new("full_name_kana", &["フリガナ", "カナ"], Text, false),
    FieldSpec::new("full_name_roman", &["ローマ字"], Text, false),
    FieldSpec::new("date_of_birth", &["生年月日"], Date, false),
    FieldSpec::new("gender", &["性別"], Enum(EnumKind::Gender), false),
    FieldSpec::new("nationality", &["国籍"], Text, false),
    FieldSpec::new("postal_code", &["郵便番号"], Text, false),
    FieldSpec::new("address", &["住所", "現住所"], Text, false),
    FieldSpec::new("phone", &["電話番号"], Text, false),
    FieldSpec::new("mobile_phone", &["携帯電話", "携帯番号"], Text, false),
    FieldSpec::new("email", &["メール", "メールアドレス"], Text, false),
    FieldSpec::new("zairyu_card_number", &["在留カード番号"], Text, false),
    FieldSpec::new("visa_type", &["ビザ種類", "在留資格"], Enum(EnumKind::VisaType), false),
    FieldSpec::new("zairyu_expire_date", &["ビザ期限", "在留期限"], Date, false),
    FieldSpec::new("factory_id", &["派遣先ID", "工場ID"], Text, false),
    FieldSpec::new("hire_date", &["入社日"], Date, false),
    FieldSpec::new("jikyu", &["時給"], Integer, false),
    FieldSpec::new("position", &["職種"], Text, false),
    FieldSpec::new("contract_type", &["契約形態"], Text, false),
    FieldSpec::new("apartment_id", &["寮ID", "アパートID"], Integer, false),
    FieldSpec::new("apartment_rent", &["家賃"], Integer, false),
];

// ==========================================
// 考勤表头
// ==========================================
const TIMER_CARD_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("work_date", &["日付", "勤務日"], Date, true),
    FieldSpec::new("hakenmoto_id", &["社員ID", "派遣元ID"], Text, true),
    FieldSpec::new("employee_name", &["社員名", "氏名"], Text, false),
    FieldSpec::new("clock_in", &["出勤時刻", "出勤"], Time, false),
    FieldSpec::new("clock_out", &["退勤時刻", "退勤"], Time, false),
    FieldSpec::new("break_minutes", &["休憩(分)", "休憩"], Integer, false),
    FieldSpec::new("notes", &["備考"], Text, false),
];

/// 取得实体种类对应的字段声明（声明顺序即模板列顺序）
pub fn fields_for(kind: EntityKind) -> &'static [FieldSpec] {
    match kind {
        EntityKind::Employee => EMPLOYEE_FIELDS,
        EntityKind::TimerCard => TIMER_CARD_FIELDS,
    }
}

/// 按表头查找字段声明
pub fn lookup(kind: EntityKind, header: &str) -> Option<&'static FieldSpec> {
    fields_for(kind).iter().find(|spec| spec.matches(header))
}

/// 模板列名
pub fn template_headers(kind: EntityKind) -> Vec<&'static str> {
    fields_for(kind).iter().map(|spec| spec.template_header()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup_trims_header() {
        let spec = lookup(EntityKind::Employee, " 氏名 ").unwrap();
        assert_eq!(spec.canonical, "full_name_kanji");
        assert!(spec.required);
    }

    #[test]
    fn test_alias_resolves_to_same_field() {
        assert_eq!(
            lookup(EntityKind::Employee, "在留資格").unwrap().canonical,
            lookup(EntityKind::Employee, "ビザ種類").unwrap().canonical
        );
    }

    #[test]
    fn test_headers_unique_within_kind() {
        for kind in [EntityKind::Employee, EntityKind::TimerCard] {
            let mut seen = HashSet::new();
            for spec in fields_for(kind) {
                for header in spec.headers {
                    assert!(seen.insert(*header), "duplicate header {} in {}", header, kind);
                }
            }
        }
    }

    #[test]
    fn test_template_headers_order() {
        let headers = template_headers(EntityKind::TimerCard);
        assert_eq!(&headers[..5], &["日付", "社員ID", "社員名", "出勤時刻", "退勤時刻"]);
    }
}
