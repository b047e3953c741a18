// ==========================================
// 人事取込バックエンド - 派遣先工厂配置
// ==========================================
// 来源: 每个工厂一个 JSON 文件
// 对齐: factories 表（config_json 保存原文）
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactoryConfig {
    pub factory_id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,

    /// 其余配置项（班次、单价等）原样保留
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FactoryConfig {
    /// 必填项校验（serde 只保证字段存在）
    pub fn validate(&self) -> Result<(), String> {
        if self.factory_id.trim().is_empty() {
            return Err("factory_id is empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("name is empty".to_string());
        }
        Ok(())
    }
}
