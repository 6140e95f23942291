//! 新区块通知

use serde::{Deserialize, Serialize};

use crate::events::NewBlockEvent;
use crate::payload::{NotificationKind, NotificationPayload};
use crate::record::NotificationView;

/// 观察到新区块时生成的通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlockNotification {
    pub crypto_code: String,
    pub height: u64,
}

impl NewBlockNotification {
    pub fn new(crypto_code: impl Into<String>, height: u64) -> Self {
        Self {
            crypto_code: crypto_code.into(),
            height,
        }
    }
}

impl From<&NewBlockEvent> for NewBlockNotification {
    fn from(event: &NewBlockEvent) -> Self {
        Self::new(event.crypto_code.clone(), event.height)
    }
}

impl NotificationPayload for NewBlockNotification {
    fn type_tag(&self) -> &'static str {
        Self::TYPE_TAG
    }

    fn project(&self, view: &mut NotificationView) {
        // 正文与事件的字符串形式保持一致
        let event = NewBlockEvent::new(self.crypto_code.clone(), self.height);
        view.body = event.to_string();
        view.action_link = String::new();
    }

    fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

impl NotificationKind for NewBlockNotification {
    const TYPE_TAG: &'static str = "NewBlock";
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn empty_view() -> NotificationView {
        NotificationView {
            id: "notif-001".to_string(),
            created: Utc::now(),
            seen: false,
            body: String::new(),
            action_link: "stale".to_string(),
        }
    }

    #[test]
    fn test_project_fills_body_and_link() {
        let payload = NewBlockNotification::new("BTC", 700_000);
        let mut view = empty_view();

        payload.project(&mut view);

        assert_eq!(view.body, "BTC: New block");
        assert_eq!(view.action_link, "");
        // 共享字段不受投影影响
        assert_eq!(view.id, "notif-001");
        assert!(!view.seen);
    }

    #[test]
    fn test_serialized_field_names() {
        let payload = NewBlockNotification::new("LTC", 42);
        let json = String::from_utf8(payload.to_bytes().unwrap()).unwrap();

        assert_eq!(json, r#"{"cryptoCode":"LTC","height":42}"#);
    }

    #[test]
    fn test_from_event() {
        let event = NewBlockEvent::new("BTC", 700_000);
        let payload = NewBlockNotification::from(&event);

        assert_eq!(payload, NewBlockNotification::new("BTC", 700_000));
        assert_eq!(payload.type_tag(), "NewBlock");
    }
}
