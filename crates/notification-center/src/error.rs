//! 通知中心错误类型
//!
//! 定义通知创建、类型解析、负载编解码和存储访问等场景的错误分类，
//! 便于批量还原时区分"跳过单条记录"与"中止整体流程"。

use thiserror::Error;

use crate::codec::CodecError;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("未注册的通知类型: {tag}")]
    UnknownNotificationType { tag: String },

    #[error("通知类型重复注册: {tag}")]
    DuplicateNotificationType { tag: String },

    #[error("非法的通知类型标识: {tag:?}")]
    InvalidTypeTag { tag: String },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("通知负载与类型 {tag} 的结构不匹配: {source}")]
    PayloadSchema {
        tag: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("通知负载序列化失败: 类型={tag}, 原因={source}")]
    Serialization {
        tag: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("通知记录未找到: {id}")]
    NotFound { id: String },
}

impl NotificationError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownNotificationType { .. } => "UNKNOWN_NOTIFICATION_TYPE",
            Self::DuplicateNotificationType { .. } => "DUPLICATE_NOTIFICATION_TYPE",
            Self::InvalidTypeTag { .. } => "INVALID_TYPE_TAG",
            Self::Codec(_) => "CODEC_ERROR",
            Self::PayloadSchema { .. } => "PAYLOAD_SCHEMA_ERROR",
            Self::Serialization { .. } => "SERIALIZATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
        }
    }

    /// 是否只影响单条记录
    ///
    /// 批量还原时这类错误只跳过当前记录，其余记录照常处理。
    pub fn is_record_local(&self) -> bool {
        matches!(
            self,
            Self::UnknownNotificationType { .. } | Self::Codec(_) | Self::PayloadSchema { .. }
        )
    }

    /// 指标标签中的失败原因
    pub(crate) fn failure_reason(&self) -> &'static str {
        match self {
            Self::UnknownNotificationType { .. } => "unknown_type",
            Self::Codec(_) => "codec",
            Self::PayloadSchema { .. } => "payload_schema",
            _ => "other",
        }
    }
}

pub type Result<T> = std::result::Result<T, NotificationError>;
