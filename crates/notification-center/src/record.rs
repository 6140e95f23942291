//! 通知记录与展示视图
//!
//! `NotificationRecord` 是交给存储层的统一行结构：不论通知类型如何，
//! 负载都以压缩后的不透明 blob 保存，靠 `notification_type` 还原出具体类型。
//! `NotificationView` 是每次还原时新生成的展示对象，不落库。

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 持久化的通知记录
///
/// 除 `seen` 外全部字段创建后不可变。序列化为 JSON 时 blob 使用 base64 编码。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: String,
    pub created: DateTime<Utc>,
    pub seen: bool,
    /// 负载的类型标识，大小写不敏感
    pub notification_type: String,
    #[serde(with = "blob_base64")]
    pub blob: Vec<u8>,
}

/// 通知展示视图
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: String,
    pub created: DateTime<Utc>,
    pub seen: bool,
    pub body: String,
    /// 跳转链接，没有时为空串
    pub action_link: String,
}

impl NotificationView {
    /// 以记录的共享字段预填视图，body / action_link 留给负载投影
    pub fn from_record(record: &NotificationRecord) -> Self {
        Self {
            id: record.id.clone(),
            created: record.created,
            seen: record.seen,
            body: String::new(),
            action_link: String::new(),
        }
    }
}

/// 带创建时间与 id 的通知条目，记录与视图共用同一套排序规则
pub trait Chronological {
    fn created(&self) -> DateTime<Utc>;

    fn id(&self) -> &str;
}

impl Chronological for NotificationRecord {
    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl Chronological for NotificationView {
    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// 最新在前：创建时间倒序，时间相同时按 id 倒序保证结果稳定
pub fn newest_first<T: Chronological>(a: &T, b: &T) -> Ordering {
    b.created()
        .cmp(&a.created())
        .then_with(|| b.id().cmp(a.id()))
}

/// 按 [`newest_first`] 原地排序
pub fn sort_newest_first<T: Chronological>(items: &mut [T]) {
    items.sort_by(newest_first);
}

mod blob_base64 {
    use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(blob: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(blob))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| D::Error::custom(format!("blob base64 解码失败: {e}")))
    }
}
