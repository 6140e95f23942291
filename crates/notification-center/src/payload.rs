//! 通知负载抽象
//!
//! 每种通知类型携带自己的负载结构，并负责把负载投影到通用的展示视图上。
//! `NotificationPayload` 保持对象安全，创建与还原路径都以 `dyn` 形式处理；
//! `NotificationKind` 额外要求 serde 能力和静态类型标识，用于注册。

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::record::NotificationView;

/// 通知负载
pub trait NotificationPayload: fmt::Debug + Send + Sync {
    /// 注册时使用的类型标识
    fn type_tag(&self) -> &'static str;

    /// 填充视图中与类型相关的字段
    ///
    /// 只允许修改 `body` 与 `action_link`，id / created / seen 由记录决定。
    fn project(&self, view: &mut NotificationView);

    /// 结构化序列化（JSON），结果交给编解码器压缩
    fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error>;
}

/// 可注册的通知类型
pub trait NotificationKind:
    NotificationPayload + Serialize + DeserializeOwned + 'static
{
    const TYPE_TAG: &'static str;
}
