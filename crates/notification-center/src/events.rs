//! 领域事件模型
//!
//! 领域事件由外部观察者（如区块监听器）产生，只在内存中流转、不落库。
//! 事件处理器根据事件决定是否生成通知。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 事件种类，用于把事件路由到已注册的处理器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    NewBlock,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NewBlock => "NewBlock",
        };
        f.write_str(s)
    }
}

/// 新区块事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlockEvent {
    pub crypto_code: String,
    pub height: u64,
}

impl NewBlockEvent {
    pub fn new(crypto_code: impl Into<String>, height: u64) -> Self {
        Self {
            crypto_code: crypto_code.into(),
            height,
        }
    }
}

impl fmt::Display for NewBlockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: New block", self.crypto_code)
    }
}

/// 领域事件
///
/// JSON 形式以 `type` 字段区分种类，例如
/// `{"type":"NewBlock","cryptoCode":"BTC","height":700000}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    NewBlock(NewBlockEvent),
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::NewBlock(_) => EventKind::NewBlock,
        }
    }
}

impl From<NewBlockEvent> for DomainEvent {
    fn from(event: NewBlockEvent) -> Self {
        Self::NewBlock(event)
    }
}

impl fmt::Display for DomainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewBlock(event) => fmt::Display::fmt(event, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_block_display() {
        let event = NewBlockEvent::new("BTC", 700_000);
        assert_eq!(event.to_string(), "BTC: New block");
        assert_eq!(DomainEvent::from(event).to_string(), "BTC: New block");
    }

    #[test]
    fn test_domain_event_json_shape() {
        let json = r#"{"type":"NewBlock","cryptoCode":"BTC","height":700000}"#;
        let event: DomainEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.kind(), EventKind::NewBlock);
        assert_eq!(event, DomainEvent::NewBlock(NewBlockEvent::new("BTC", 700_000)));
        assert_eq!(serde_json::to_string(&event).unwrap(), json);
    }

    #[test]
    fn test_unknown_event_type_rejected() {
        let json = r#"{"type":"Vandalized","cryptoCode":"BTC","height":1}"#;
        assert!(serde_json::from_str::<DomainEvent>(json).is_err());
    }
}
