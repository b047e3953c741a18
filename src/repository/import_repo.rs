// ==========================================
// 人事取込バックエンド - 取込 Repository Trait
// ==========================================
// 职责: 定义取込相关数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::import::{CanonicalRecord, EntityId, NaturalKey, ReferenceSnapshot};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

/// upsert 结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub entity_id: EntityId,
    pub was_update: bool,
}

// ==========================================
// ImportRepository Trait
// ==========================================
// 用途: 取込管道的参照数据读取 + 单行写入
// 实现者: ImportRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ImportRepository: Send + Sync {
    // ===== 参照数据 =====

    /// 一次性读取校验所需的参照数据（工厂 / 宿舍 / 社员）
    async fn load_reference_snapshot(&self) -> RepositoryResult<ReferenceSnapshot>;

    async fn factory_exists(&self, factory_id: &str) -> RepositoryResult<bool>;

    async fn apartment_exists(&self, apartment_id: i64) -> RepositoryResult<bool>;

    // ===== 自然键 =====

    async fn find_by_natural_key(&self, key: &NaturalKey) -> RepositoryResult<Option<EntityId>>;

    // ===== 写入（均为单行事务）=====

    /// 插入新记录
    ///
    /// # 返回
    /// - Err: 唯一/外键约束违反等存储错误
    async fn insert(&self, record: &CanonicalRecord) -> RepositoryResult<EntityId>;

    /// 更新已有记录（仅覆盖记录中出现的字段）
    async fn update(&self, id: EntityId, record: &CanonicalRecord) -> RepositoryResult<()>;

    /// 按自然键查找后 insert 或 update，查找与写入在同一事务
    async fn upsert(
        &self,
        key: &NaturalKey,
        record: &CanonicalRecord,
    ) -> RepositoryResult<UpsertOutcome>;
}
