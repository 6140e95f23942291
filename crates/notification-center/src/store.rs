//! 通知存储
//!
//! `NotificationStore` 定义存储协作方需要提供的能力，真实部署中由数据库实现。
//! `InMemoryNotificationStore` 基于 DashMap，适用于测试、CLI 和开发环境。

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::{NotificationError, Result};
use crate::record::{NotificationRecord, sort_newest_first};

/// 通知存储抽象
///
/// 记录写入后只有 `seen` 可以变更。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, record: NotificationRecord) -> Result<()>;

    /// 批量写入，要么全部写入要么全部不写入
    async fn insert_batch(&self, records: Vec<NotificationRecord>) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<NotificationRecord>>;

    /// 全部记录，按创建时间倒序（最新在前）
    async fn list(&self) -> Result<Vec<NotificationRecord>>;

    /// 标记为已读，记录不存在时返回 `NotFound`
    async fn mark_seen(&self, id: &str) -> Result<()>;

    /// 全部标记为已读，返回本次实际变更的条数
    async fn mark_all_seen(&self) -> Result<usize>;

    async fn unseen_count(&self) -> Result<usize>;

    /// 删除记录，返回被删除的记录
    async fn remove(&self, id: &str) -> Result<Option<NotificationRecord>>;
}

/// 内存通知存储
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationStore {
    records: Arc<DashMap<String, NotificationRecord>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert(&self, record: NotificationRecord) -> Result<()> {
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn insert_batch(&self, records: Vec<NotificationRecord>) -> Result<()> {
        for record in records {
            self.records.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<NotificationRecord>> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> Result<Vec<NotificationRecord>> {
        let mut records: Vec<NotificationRecord> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn mark_seen(&self, id: &str) -> Result<()> {
        let mut entry = self
            .records
            .get_mut(id)
            .ok_or_else(|| NotificationError::NotFound { id: id.to_string() })?;
        entry.seen = true;
        Ok(())
    }

    async fn mark_all_seen(&self) -> Result<usize> {
        let mut changed = 0;
        for mut entry in self.records.iter_mut() {
            if !entry.seen {
                entry.seen = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn unseen_count(&self) -> Result<usize> {
        Ok(self.records.iter().filter(|entry| !entry.seen).count())
    }

    async fn remove(&self, id: &str) -> Result<Option<NotificationRecord>> {
        Ok(self.records.remove(id).map(|(_, record)| record))
    }
}
