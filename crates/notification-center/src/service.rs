//! 通知服务
//!
//! 把事件分发、记录存储和还原串成完整流程：
//! 领域事件 -> 处理器 -> 通知记录 -> 存储；存储 -> 批量还原 -> 展示视图。

use std::sync::Arc;

use notify_shared::config::AppConfig;
use tracing::{info, instrument};

use crate::codec::codec_from_config;
use crate::error::Result;
use crate::events::DomainEvent;
use crate::factory::NotificationFactory;
use crate::handlers::{DispatchOutcome, EventDispatcher};
use crate::record::{NotificationView, sort_newest_first};
use crate::registry::NotificationRegistry;
use crate::rehydrator::{NotificationRehydrator, RehydrationBatch};
use crate::store::NotificationStore;

/// 通知服务
pub struct NotificationService {
    dispatcher: EventDispatcher,
    rehydrator: NotificationRehydrator,
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(
        dispatcher: EventDispatcher,
        rehydrator: NotificationRehydrator,
        store: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            dispatcher,
            rehydrator,
            store,
        }
    }

    /// 按配置装配内置通知类型、处理器与编解码器
    pub fn from_config(config: &AppConfig, store: Arc<dyn NotificationStore>) -> Result<Self> {
        let registry = Arc::new(NotificationRegistry::with_builtin_kinds()?);
        let codec = codec_from_config(&config.codec)?;

        info!(
            codec = codec.name(),
            notification_types = ?registry.tags(),
            "通知服务初始化"
        );

        let factory = NotificationFactory::new(registry.clone(), codec.clone());
        let dispatcher = EventDispatcher::with_builtin_handlers(factory);
        let rehydrator = NotificationRehydrator::new(registry, codec);
        Ok(Self::new(dispatcher, rehydrator, store))
    }

    pub fn rehydrator(&self) -> &NotificationRehydrator {
        &self.rehydrator
    }

    /// 处理领域事件并保存生成的通知记录
    ///
    /// 成功创建的记录一次性批量写入存储；处理器或创建失败不写入任何内容，
    /// 明细在 `DispatchOutcome::failures` 中返回。存储写入失败时返回 `Err`，
    /// 此时本批记录是否落库取决于存储实现的批量写入语义。
    #[instrument(skip(self), fields(event_kind = %event.kind()))]
    pub async fn publish(&self, event: &DomainEvent) -> Result<DispatchOutcome> {
        let outcome = self.dispatcher.dispatch(event).await;
        if !outcome.records.is_empty() {
            self.store.insert_batch(outcome.records.clone()).await?;
        }
        Ok(outcome)
    }

    /// 还原全部通知，最新在前；无法还原的记录被跳过
    pub async fn list_views(&self) -> Result<Vec<NotificationView>> {
        Ok(self.list_batch().await?.views)
    }

    /// 还原全部通知并保留失败明细
    pub async fn list_batch(&self) -> Result<RehydrationBatch> {
        let records = self.store.list().await?;
        let mut batch = self.rehydrator.rehydrate_batch(&records);
        sort_newest_first(&mut batch.views);
        Ok(batch)
    }

    pub async fn mark_seen(&self, id: &str) -> Result<()> {
        self.store.mark_seen(id).await
    }

    pub async fn mark_all_seen(&self) -> Result<usize> {
        self.store.mark_all_seen().await
    }

    pub async fn unseen_count(&self) -> Result<usize> {
        self.store.unseen_count().await
    }
}
