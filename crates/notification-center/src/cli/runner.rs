//! CLI 命令执行器
//!
//! 每次运行使用独立的内存存储，命令之间不共享状态。

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use notify_shared::config::AppConfig;
use serde::Serialize;
use tracing::{info, warn};

use crate::events::{DomainEvent, NewBlockEvent};
use crate::handlers::DispatchFailure;
use crate::record::{NotificationRecord, NotificationView, sort_newest_first};
use crate::rehydrator::RehydrationBatch;
use crate::service::NotificationService;
use crate::store::InMemoryNotificationStore;

/// 还原失败的输出格式
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureReport {
    record_id: String,
    notification_type: String,
    code: &'static str,
    error: String,
}

/// 事件处理失败的输出格式
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DispatchFailureReport {
    event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification_type: Option<String>,
    code: &'static str,
    error: String,
}

impl DispatchFailureReport {
    fn new(event: &DomainEvent, failure: DispatchFailure) -> Self {
        Self {
            event: event.to_string(),
            notification_type: failure.notification_type,
            code: failure.error.code(),
            error: failure.error.to_string(),
        }
    }
}

/// 命令输出
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    views: Vec<NotificationView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<FailureReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dispatch_failures: Vec<DispatchFailureReport>,
}

impl From<RehydrationBatch> for Report {
    fn from(batch: RehydrationBatch) -> Self {
        Self {
            views: batch.views,
            failures: batch
                .failures
                .into_iter()
                .map(|failure| FailureReport {
                    record_id: failure.record_id,
                    notification_type: failure.notification_type,
                    code: failure.error.code(),
                    error: failure.error.to_string(),
                })
                .collect(),
            dispatch_failures: Vec::new(),
        }
    }
}

/// 命令执行器
pub struct CommandRunner {
    service: NotificationService,
}

impl CommandRunner {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let store = Arc::new(InMemoryNotificationStore::new());
        let service = NotificationService::from_config(config, store)?;
        Ok(Self::with_service(service))
    }

    pub fn with_service(service: NotificationService) -> Self {
        Self { service }
    }

    /// 发布单个新区块事件，任一通知创建失败即返回错误
    pub async fn run_new_block(&self, crypto_code: &str, height: u64) -> Result<String> {
        let event = DomainEvent::NewBlock(NewBlockEvent::new(crypto_code, height));
        let outcome = self.service.publish(&event).await?;
        if let Some(failure) = outcome.failures.into_iter().next() {
            bail!(
                "事件 {event} 的通知生成失败 [{}]: {}",
                failure.error.code(),
                failure.error
            );
        }
        self.render_all(Vec::new()).await
    }

    /// 回放事件文件，无法解析的行记录日志后跳过
    pub async fn run_replay(&self, file: &Path) -> Result<String> {
        let content = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("读取事件文件失败: {}", file.display()))?;

        let mut published = 0;
        let mut dispatch_failures = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<DomainEvent>(line) {
                Ok(event) => {
                    let outcome = self.service.publish(&event).await?;
                    dispatch_failures.extend(
                        outcome
                            .failures
                            .into_iter()
                            .map(|failure| DispatchFailureReport::new(&event, failure)),
                    );
                    published += 1;
                }
                Err(e) => {
                    warn!(line = index + 1, error = %e, "无法解析的事件行，已跳过");
                }
            }
        }

        info!(
            file = %file.display(),
            published,
            failed = dispatch_failures.len(),
            "事件回放完成"
        );
        self.render_all(dispatch_failures).await
    }

    /// 还原导出的记录文件
    pub async fn run_inspect(&self, file: &Path) -> Result<String> {
        let content = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("读取记录文件失败: {}", file.display()))?;
        let records: Vec<NotificationRecord> =
            serde_json::from_str(&content).context("记录文件不是合法的通知记录数组")?;

        let mut batch = self.service.rehydrator().rehydrate_batch(&records);
        sort_newest_first(&mut batch.views);
        render(&Report::from(batch))
    }

    async fn render_all(&self, dispatch_failures: Vec<DispatchFailureReport>) -> Result<String> {
        let batch = self.service.list_batch().await?;
        let mut report = Report::from(batch);
        report.dispatch_failures = dispatch_failures;
        render(&report)
    }
}

fn render(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).context("输出序列化失败")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecError, MockPayloadCodec, PayloadCodec};
    use crate::factory::NotificationFactory;
    use crate::handlers::EventDispatcher;
    use crate::payloads::NewBlockNotification;
    use crate::rehydrator::NotificationRehydrator;
    use crate::test_utils::{test_pipeline, test_registry};
    use std::io;

    /// 压缩总是失败的执行器
    fn failing_runner() -> CommandRunner {
        let mut codec = MockPayloadCodec::new();
        codec
            .expect_compress()
            .returning(|_| Err(CodecError::Compress(io::Error::other("disk full"))));
        codec.expect_name().return_const("mock");
        let codec: Arc<dyn PayloadCodec> = Arc::new(codec);

        let registry = test_registry();
        let service = NotificationService::new(
            EventDispatcher::with_builtin_handlers(NotificationFactory::new(
                registry.clone(),
                codec.clone(),
            )),
            NotificationRehydrator::new(registry, codec),
            Arc::new(InMemoryNotificationStore::new()),
        );
        CommandRunner::with_service(service)
    }

    fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{name}", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_run_new_block() {
        let runner = CommandRunner::new(&AppConfig::default()).unwrap();
        let output = runner.run_new_block("BTC", 700_000).await.unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["views"][0]["body"], "BTC: New block");
        assert_eq!(json["views"][0]["seen"], false);
        assert!(json.get("failures").is_none());
        assert!(json.get("dispatchFailures").is_none());
    }

    #[tokio::test]
    async fn test_run_new_block_fails_when_creation_fails() {
        let result = failing_runner().run_new_block("BTC", 700_000).await;

        let message = result.unwrap_err().to_string();
        assert!(message.contains("CODEC_ERROR"));
        assert!(message.contains("BTC: New block"));
    }

    #[tokio::test]
    async fn test_run_replay_reports_creation_failures() {
        let path = temp_file(
            "failing-events.jsonl",
            "{\"type\":\"NewBlock\",\"cryptoCode\":\"BTC\",\"height\":1}\n",
        );

        let output = failing_runner().run_replay(&path).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(json["views"].as_array().unwrap().is_empty());
        assert_eq!(json["dispatchFailures"][0]["event"], "BTC: New block");
        assert_eq!(json["dispatchFailures"][0]["notificationType"], "NewBlock");
        assert_eq!(json["dispatchFailures"][0]["code"], "CODEC_ERROR");
    }

    #[tokio::test]
    async fn test_run_replay_skips_bad_lines() {
        let path = temp_file(
            "events.jsonl",
            concat!(
                "{\"type\":\"NewBlock\",\"cryptoCode\":\"BTC\",\"height\":1}\n",
                "\n",
                "not json\n",
                "{\"type\":\"NewBlock\",\"cryptoCode\":\"LTC\",\"height\":2}\n",
            ),
        );
        let runner = CommandRunner::new(&AppConfig::default()).unwrap();

        let output = runner.run_replay(&path).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["views"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_run_inspect_reports_failures() {
        let (factory, _) = test_pipeline();
        let good = factory.create(&NewBlockNotification::new("BTC", 7)).unwrap();
        let mut unknown = good.clone();
        unknown.id = "notif-vandalized".to_string();
        unknown.notification_type = "Vandalized".to_string();

        let path = temp_file(
            "records.json",
            &serde_json::to_string(&vec![good.clone(), unknown]).unwrap(),
        );
        let runner = CommandRunner::new(&AppConfig::default()).unwrap();

        let output = runner.run_inspect(&path).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["views"][0]["id"], good.id.as_str());
        assert_eq!(json["failures"][0]["recordId"], "notif-vandalized");
        assert_eq!(json["failures"][0]["code"], "UNKNOWN_NOTIFICATION_TYPE");
    }

    #[tokio::test]
    async fn test_run_inspect_missing_file() {
        let runner = CommandRunner::new(&AppConfig::default()).unwrap();
        let result = runner.run_inspect(Path::new("/nonexistent/records.json")).await;
        assert!(result.is_err());
    }
}
