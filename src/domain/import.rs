// ==========================================
// 人事取込バックエンド - 取込领域模型
// ==========================================
// 职责: 取込管道各阶段的数据结构
// 流程: RawRow → CanonicalRecord → RowOutcome → ImportSummary
// 生命周期: 仅在一次取込调用内（不落库）
// ==========================================

use crate::domain::types::EntityKind;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::types::Value;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// 数据库实体主键
pub type EntityId = i64;

// ==========================================
// ImportBatch - 一次上传文件对应的工作单元
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ImportBatch {
    pub batch_id: String,
    pub source_file: String,
    pub entity_kind: EntityKind,
    pub created_at: DateTime<Utc>,
}

impl ImportBatch {
    pub fn new(source_file: &Path, entity_kind: EntityKind) -> Self {
        Self {
            batch_id: Uuid::new_v4().to_string(),
            source_file: source_file.display().to_string(),
            entity_kind,
            created_at: Utc::now(),
        }
    }
}

// ==========================================
// CellValue - 解码后的单元格原始值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// 文本单元格：空白视为 Empty
    pub fn text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, ""),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

// ==========================================
// RawRow - 一行原始数据（表头原文 → 单元格值）
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct RawRow {
    pub row_index: usize, // 数据行号（1 起，不含表头）
    pub cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_blank())
    }
}

// ==========================================
// FieldValue - 类型转换后的字段值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
        }
    }
}

// 日期/时间统一以 ISO 文本落库
impl From<&FieldValue> for Value {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Text(s) => Value::Text(s.clone()),
            FieldValue::Integer(i) => Value::Integer(*i),
            FieldValue::Date(_) | FieldValue::Time(_) => Value::Text(value.to_string()),
        }
    }
}

// ==========================================
// CanonicalRecord - 字段映射后的标准记录
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalRecord {
    pub row_index: usize,
    pub entity_kind: EntityKind,
    fields: BTreeMap<&'static str, FieldValue>,
}

impl CanonicalRecord {
    pub fn new(row_index: usize, entity_kind: EntityKind) -> Self {
        Self {
            row_index,
            entity_kind,
            fields: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, field: &'static str, value: FieldValue) {
        self.fields.insert(field, value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        match self.fields.get(field) {
            Some(FieldValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        match self.fields.get(field) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn time(&self, field: &str) -> Option<NaiveTime> {
        match self.fields.get(field) {
            Some(FieldValue::Time(t)) => Some(*t),
            _ => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 自然键（社员: 派遣元ID；考勤: 派遣元ID + 日付）
    ///
    /// 必填字段缺失时返回 None，由 Row Validator 先行拦截
    pub fn natural_key(&self) -> Option<NaturalKey> {
        let hakenmoto_id = self.text("hakenmoto_id")?.to_string();
        match self.entity_kind {
            EntityKind::Employee => Some(NaturalKey::Employee { hakenmoto_id }),
            EntityKind::TimerCard => Some(NaturalKey::TimerCard {
                hakenmoto_id,
                work_date: self.date("work_date")?,
            }),
        }
    }
}

// ==========================================
// NaturalKey - 判定 insert / update 的业务键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NaturalKey {
    Employee {
        hakenmoto_id: String,
    },
    TimerCard {
        hakenmoto_id: String,
        work_date: NaiveDate,
    },
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NaturalKey::Employee { hakenmoto_id } => write!(f, "hakenmoto_id={}", hakenmoto_id),
            NaturalKey::TimerCard {
                hakenmoto_id,
                work_date,
            } => write!(f, "hakenmoto_id={}, work_date={}", hakenmoto_id, work_date),
        }
    }
}

// ==========================================
// ImportContext - 调用方传入的取込上下文
// ==========================================
#[derive(Debug, Clone)]
pub struct ImportContext {
    /// 严格模式: 字典外的列视为映射错误
    pub strict_headers: bool,
    /// 考勤取込的工厂 + 年月窗口
    pub timer_card: Option<TimerCardWindow>,
    /// 业务基准日（生年月日未来日期校验）
    pub batch_date: NaiveDate,
}

impl ImportContext {
    pub fn employees() -> Self {
        Self {
            strict_headers: false,
            timer_card: None,
            batch_date: chrono::Local::now().date_naive(),
        }
    }

    pub fn timer_cards(factory_id: impl Into<String>, year: i32, month: u32) -> Self {
        Self {
            timer_card: Some(TimerCardWindow {
                factory_id: factory_id.into(),
                year,
                month,
            }),
            ..Self::employees()
        }
    }

    pub fn with_strict_headers(mut self, strict: bool) -> Self {
        self.strict_headers = strict;
        self
    }

    pub fn with_batch_date(mut self, date: NaiveDate) -> Self {
        self.batch_date = date;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerCardWindow {
    pub factory_id: String,
    pub year: i32,
    pub month: u32,
}

impl TimerCardWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

// ==========================================
// ReferenceSnapshot - 校验用的只读参照数据
// ==========================================
// 取自存储层的快照，并发取込下允许短暂过期
#[derive(Debug, Clone, Default)]
pub struct ReferenceSnapshot {
    pub factory_ids: HashSet<String>,
    pub apartment_ids: HashSet<i64>,
    pub employee_ids: HashSet<String>, // 已登记的派遣元ID
}

impl ReferenceSnapshot {
    pub fn factory_exists(&self, factory_id: &str) -> bool {
        self.factory_ids.contains(factory_id)
    }

    pub fn apartment_exists(&self, apartment_id: i64) -> bool {
        self.apartment_ids.contains(&apartment_id)
    }

    pub fn employee_exists(&self, hakenmoto_id: &str) -> bool {
        self.employee_ids.contains(hakenmoto_id)
    }
}

// ==========================================
// RowOutcome - 每个输入行恰好一个结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    Accepted {
        row_index: usize,
        entity_id: EntityId,
        was_update: bool,
    },
    Rejected {
        row_index: usize,
        reason: String,
    },
}

impl RowOutcome {
    pub fn row_index(&self) -> usize {
        match self {
            RowOutcome::Accepted { row_index, .. } | RowOutcome::Rejected { row_index, .. } => {
                *row_index
            }
        }
    }
}

// ==========================================
// ImportSummary - 返回调用方的汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowErrorEntry {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub rejected: usize,
    pub errors: Vec<RowErrorEntry>,
}

impl ImportSummary {
    pub fn accepted(&self) -> usize {
        self.created + self.updated
    }

    /// 输入行总数（不变式: 等于解码行数）
    pub fn total_rows(&self) -> usize {
        self.accepted() + self.rejected
    }
}
