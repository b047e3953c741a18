// ==========================================
// 人事取込バックエンド - 领域类型定义
// ==========================================
// 职责: 实体种类、性别、在留资格等枚举
// 序列化格式: 与 API 输出 / 数据库文本列一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 取込实体种类 (Entity Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Employee,  // 社员
    TimerCard, // 考勤卡（タイムカード）
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Employee => "employee",
            EntityKind::TimerCard => "timer_card",
        }
    }

    /// 对应的数据库表
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Employee => "employees",
            EntityKind::TimerCard => "timer_cards",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    /// 兼容 CLI / 路由中的复数写法（employees / timer-cards）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "employee" | "employees" => Ok(EntityKind::Employee),
            "timer_card" | "timer_cards" | "timer-card" | "timer-cards" => {
                Ok(EntityKind::TimerCard)
            }
            other => Err(format!("unknown entity kind: {}", other)),
        }
    }
}

// ==========================================
// 性别 (Gender)
// ==========================================
// 入库值统一为日文标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALLOWED_LABELS: &'static [&'static str] = &[
        "男", "男性", "M", "Male", "女", "女性", "F", "Female", "その他", "Other",
    ];

    /// 解析表格中的性别标签（大小写不敏感）
    pub fn parse_label(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "男" | "男性" | "m" | "male" => Some(Gender::Male),
            "女" | "女性" | "f" | "female" => Some(Gender::Female),
            "その他" | "other" => Some(Gender::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "男性",
            Gender::Female => "女性",
            Gender::Other => "その他",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 在留资格 (Visa Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisaType {
    PermanentResident,
    LongTermResident,
    SpouseOfJapanese,
    SpouseOfPermanentResident,
    TechnicalIntern,
    SpecifiedSkilled1,
    SpecifiedSkilled2,
    Engineer,
    Student,
    Dependent,
    DesignatedActivities,
}

const VISA_LABELS: &[(&str, VisaType)] = &[
    ("永住者", VisaType::PermanentResident),
    ("定住者", VisaType::LongTermResident),
    ("日本人の配偶者等", VisaType::SpouseOfJapanese),
    ("永住者の配偶者等", VisaType::SpouseOfPermanentResident),
    ("技能実習", VisaType::TechnicalIntern),
    ("特定技能1号", VisaType::SpecifiedSkilled1),
    ("特定技能2号", VisaType::SpecifiedSkilled2),
    ("技術・人文知識・国際業務", VisaType::Engineer),
    ("留学", VisaType::Student),
    ("家族滞在", VisaType::Dependent),
    ("特定活動", VisaType::DesignatedActivities),
];

impl VisaType {
    /// 全角数字（特定技能１号）按半角处理
    pub fn parse_label(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '１' => '1',
                '２' => '2',
                _ => c,
            })
            .collect();

        VISA_LABELS
            .iter()
            .find(|(label, _)| *label == normalized)
            .map(|(_, visa)| *visa)
    }

    pub fn as_str(&self) -> &'static str {
        VISA_LABELS
            .iter()
            .find(|(_, visa)| visa == self)
            .map(|(label, _)| *label)
            .unwrap_or("特定活動")
    }

    pub fn allowed_labels() -> Vec<&'static str> {
        VISA_LABELS.iter().map(|(label, _)| *label).collect()
    }
}

impl fmt::Display for VisaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
