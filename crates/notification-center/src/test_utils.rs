//! 测试工具模块
//!
//! 提供集成测试与基准测试共用的装配函数和随机数据生成器。

use std::sync::Arc;

use fake::Fake;

use crate::codec::{BrotliCodec, PayloadCodec};
use crate::events::{DomainEvent, NewBlockEvent};
use crate::factory::NotificationFactory;
use crate::payloads::NewBlockNotification;
use crate::record::NotificationRecord;
use crate::registry::NotificationRegistry;
use crate::rehydrator::NotificationRehydrator;

/// 测试中使用的币种代码
pub const CRYPTO_CODES: [&str; 4] = ["BTC", "LTC", "ETH", "XMR"];

/// 内置类型注册表
pub fn test_registry() -> Arc<NotificationRegistry> {
    Arc::new(NotificationRegistry::with_builtin_kinds().expect("内置通知类型注册失败"))
}

/// 共用同一注册表与 brotli 编解码器的工厂和还原器
pub fn test_pipeline() -> (NotificationFactory, NotificationRehydrator) {
    let registry = test_registry();
    let codec: Arc<dyn PayloadCodec> = Arc::new(BrotliCodec::default());
    (
        NotificationFactory::new(registry.clone(), codec.clone()),
        NotificationRehydrator::new(registry, codec),
    )
}

/// 随机新区块事件
pub fn random_new_block_event() -> NewBlockEvent {
    let index = (0..CRYPTO_CODES.len()).fake::<usize>();
    NewBlockEvent::new(CRYPTO_CODES[index], (1..900_000u64).fake::<u64>())
}

/// 随机领域事件
pub fn random_domain_event() -> DomainEvent {
    DomainEvent::NewBlock(random_new_block_event())
}

/// 生成 count 条随机新区块通知记录
pub fn random_records(factory: &NotificationFactory, count: usize) -> Vec<NotificationRecord> {
    (0..count)
        .map(|_| {
            let payload = NewBlockNotification::from(&random_new_block_event());
            factory.create(&payload).expect("创建测试通知记录失败")
        })
        .collect()
}
