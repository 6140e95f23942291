//! 通知中心
//!
//! 把领域事件转换为带类型的通知记录持久化，并在展示时按记录中的类型标识
//! 还原为通用的展示视图。通知类型通过注册表显式注册，负载经压缩后以
//! 不透明 blob 保存在统一的记录结构中。

pub mod cli;
pub mod codec;
pub mod error;
pub mod events;
pub mod factory;
pub mod handlers;
pub mod payload;
pub mod payloads;
pub mod record;
pub mod registry;
pub mod rehydrator;
pub mod service;
pub mod store;
pub mod test_utils;

pub use codec::{BrotliCodec, CodecError, IdentityCodec, PayloadCodec};
pub use error::NotificationError;
pub use events::{DomainEvent, EventKind, NewBlockEvent};
pub use factory::NotificationFactory;
pub use handlers::{DispatchFailure, DispatchOutcome, EventDispatcher, EventHandler, NewBlockHandler};
pub use payload::{NotificationKind, NotificationPayload};
pub use payloads::NewBlockNotification;
pub use record::{Chronological, NotificationRecord, NotificationView, newest_first, sort_newest_first};
pub use registry::{NotificationRegistry, NotificationTypeTag, PayloadSchema};
pub use rehydrator::{NotificationRehydrator, RehydrationBatch, RehydrationFailure};
pub use service::NotificationService;
pub use store::{InMemoryNotificationStore, NotificationStore};
