//! 通知创建
//!
//! 负载 -> 结构化序列化 -> 压缩 -> 通知记录。本模块只产出记录，
//! 写入存储由调用方（或 `NotificationService`）负责。

use std::sync::Arc;

use chrono::Utc;
use notify_shared::observability::metrics::record_notification_created;
use tracing::debug;
use uuid::Uuid;

use crate::codec::PayloadCodec;
use crate::error::{NotificationError, Result};
use crate::payload::NotificationPayload;
use crate::record::NotificationRecord;
use crate::registry::NotificationRegistry;

/// 通知记录工厂
#[derive(Clone)]
pub struct NotificationFactory {
    registry: Arc<NotificationRegistry>,
    codec: Arc<dyn PayloadCodec>,
}

impl NotificationFactory {
    pub fn new(registry: Arc<NotificationRegistry>, codec: Arc<dyn PayloadCodec>) -> Self {
        Self { registry, codec }
    }

    /// 由负载生成一条待持久化的通知记录
    ///
    /// 负载类型必须已注册，否则这条记录将永远无法还原，直接返回
    /// `UnknownNotificationType`。序列化或压缩失败同步返回给调用方，不做重试。
    pub fn create(&self, payload: &dyn NotificationPayload) -> Result<NotificationRecord> {
        let tag = payload.type_tag();
        let schema = self.registry.resolve(tag)?;

        let serialized = payload
            .to_bytes()
            .map_err(|source| NotificationError::Serialization {
                tag: tag.to_string(),
                source,
            })?;
        let blob = self.codec.compress(&serialized)?;

        let record = NotificationRecord {
            // UUID v7 带时间戳前缀，按 id 排序即近似创建顺序
            id: Uuid::now_v7().to_string(),
            created: Utc::now(),
            seen: false,
            notification_type: schema.tag().to_string(),
            blob,
        };

        debug!(
            notification_id = %record.id,
            notification_type = %record.notification_type,
            codec = self.codec.name(),
            payload_bytes = serialized.len(),
            blob_bytes = record.blob.len(),
            "通知记录已创建"
        );
        record_notification_created(&record.notification_type);

        Ok(record)
    }
}
