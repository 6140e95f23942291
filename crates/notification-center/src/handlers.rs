//! 领域事件处理
//!
//! 每种事件可以注册多个处理器，处理器决定是否为事件生成通知负载。
//! `EventDispatcher` 并行执行同一事件的所有处理器，单个处理器失败
//! 不影响其他处理器生成的通知，失败明细随结果一并返回给调用方。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::error::{NotificationError, Result};
use crate::events::{DomainEvent, EventKind};
use crate::factory::NotificationFactory;
use crate::payload::NotificationPayload;
use crate::payloads::NewBlockNotification;
use crate::record::NotificationRecord;

/// 事件处理器
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// 该处理器订阅的事件种类
    fn kind(&self) -> EventKind;

    /// 处理事件，返回 `None` 表示该事件无需通知
    async fn handle(&self, event: &DomainEvent) -> Result<Option<Box<dyn NotificationPayload>>>;
}

/// 新区块事件处理器
pub struct NewBlockHandler;

#[async_trait]
impl EventHandler for NewBlockHandler {
    fn kind(&self) -> EventKind {
        EventKind::NewBlock
    }

    async fn handle(&self, event: &DomainEvent) -> Result<Option<Box<dyn NotificationPayload>>> {
        match event {
            DomainEvent::NewBlock(block) => {
                Ok(Some(Box::new(NewBlockNotification::from(block))))
            }
        }
    }
}

/// 处理器或记录创建的失败
#[derive(Debug)]
pub struct DispatchFailure {
    /// 创建失败时为负载的类型标识，处理器自身出错时为 `None`
    pub notification_type: Option<String>,
    pub error: NotificationError,
}

/// 一次分发的结果
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// 成功创建的记录，按处理器注册顺序
    pub records: Vec<NotificationRecord>,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 事件分发器
pub struct EventDispatcher {
    factory: NotificationFactory,
    handlers: HashMap<EventKind, Vec<Arc<dyn EventHandler>>>,
}

impl EventDispatcher {
    pub fn new(factory: NotificationFactory) -> Self {
        Self {
            factory,
            handlers: HashMap::new(),
        }
    }

    /// 注册全部内置处理器
    pub fn with_builtin_handlers(factory: NotificationFactory) -> Self {
        let mut dispatcher = Self::new(factory);
        dispatcher.register(Arc::new(NewBlockHandler));
        dispatcher
    }

    /// 按处理器声明的事件种类注册
    pub fn register(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.entry(handler.kind()).or_default().push(handler);
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// 分发事件并为每个返回的负载创建通知记录
    ///
    /// 单个处理器出错或创建失败不影响其他处理器，失败记录在 `failures` 中返回。
    pub async fn dispatch(&self, event: &DomainEvent) -> DispatchOutcome {
        let kind = event.kind();
        let Some(handlers) = self.handlers.get(&kind) else {
            warn!(event_kind = %kind, "未找到该事件的处理器，跳过");
            return DispatchOutcome::default();
        };

        let futures: Vec<_> = handlers.iter().map(|handler| handler.handle(event)).collect();
        let outcomes = futures::future::join_all(futures).await;

        let mut outcome = DispatchOutcome::default();
        for handled in outcomes {
            let payload = match handled {
                Ok(Some(payload)) => payload,
                Ok(None) => continue,
                Err(e) => {
                    error!(event_kind = %kind, error = %e, "事件处理器执行异常");
                    outcome.failures.push(DispatchFailure {
                        notification_type: None,
                        error: e,
                    });
                    continue;
                }
            };

            match self.factory.create(payload.as_ref()) {
                Ok(record) => outcome.records.push(record),
                Err(e) => {
                    error!(
                        event_kind = %kind,
                        notification_type = payload.type_tag(),
                        error = %e,
                        "通知记录创建失败"
                    );
                    outcome.failures.push(DispatchFailure {
                        notification_type: Some(payload.type_tag().to_string()),
                        error: e,
                    });
                }
            }
        }

        info!(
            event_kind = %kind,
            event = %event,
            created = outcome.records.len(),
            failed = outcome.failures.len(),
            "事件处理完成"
        );
        outcome
    }
}
