//! 通知还原
//!
//! 通知记录 -> 解析类型标识 -> 解压 blob -> 按类型结构解码 -> 投影为展示视图。
//! 还原是无状态、幂等的纯计算：同一条未变更的记录多次还原得到相同视图。
//!
//! 批量还原时单条记录的失败（未知类型、blob 损坏、结构不匹配）只跳过该记录，
//! 不影响同批次的其他记录。

use std::sync::Arc;

use notify_shared::observability::metrics::{
    record_notification_rehydrated, record_rehydration_failure,
};
use tracing::warn;

use crate::codec::PayloadCodec;
use crate::error::{NotificationError, Result};
use crate::record::{NotificationRecord, NotificationView};
use crate::registry::NotificationRegistry;

/// 单条记录的还原失败
#[derive(Debug)]
pub struct RehydrationFailure {
    pub record_id: String,
    pub notification_type: String,
    pub error: NotificationError,
}

/// 批量还原结果
///
/// `views` 保持输入顺序，展示前的排序由调用方决定。
#[derive(Debug, Default)]
pub struct RehydrationBatch {
    pub views: Vec<NotificationView>,
    pub failures: Vec<RehydrationFailure>,
}

impl RehydrationBatch {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 通知还原器
#[derive(Clone)]
pub struct NotificationRehydrator {
    registry: Arc<NotificationRegistry>,
    codec: Arc<dyn PayloadCodec>,
}

impl NotificationRehydrator {
    pub fn new(registry: Arc<NotificationRegistry>, codec: Arc<dyn PayloadCodec>) -> Self {
        Self { registry, codec }
    }

    /// 将一条记录还原为展示视图
    pub fn rehydrate(&self, record: &NotificationRecord) -> Result<NotificationView> {
        let schema = self.registry.resolve(&record.notification_type)?;
        let serialized = self.codec.decompress(&record.blob)?;
        let payload = schema.decode(&serialized)?;

        let mut view = NotificationView::from_record(record);
        payload.project(&mut view);

        record_notification_rehydrated(schema.tag().as_str());
        Ok(view)
    }

    /// 批量还原，单条失败记录日志后跳过
    pub fn rehydrate_batch(&self, records: &[NotificationRecord]) -> RehydrationBatch {
        let mut batch = RehydrationBatch {
            views: Vec::with_capacity(records.len()),
            failures: Vec::new(),
        };

        for record in records {
            match self.rehydrate(record) {
                Ok(view) => batch.views.push(view),
                Err(error) => {
                    warn!(
                        notification_id = %record.id,
                        notification_type = %record.notification_type,
                        error_code = error.code(),
                        error = %error,
                        "通知记录还原失败，已跳过"
                    );
                    record_rehydration_failure(error.failure_reason());
                    batch.failures.push(RehydrationFailure {
                        record_id: record.id.clone(),
                        notification_type: record.notification_type.clone(),
                        error,
                    });
                }
            }
        }

        batch
    }
}
