//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 通知中心没有常驻 HTTP 端口，指标快照由调用方通过 `render` 获取后自行输出。

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Metrics 资源守卫
pub struct MetricsHandle {
    handle: PrometheusHandle,
}

impl MetricsHandle {
    /// 渲染 Prometheus 文本格式的指标快照
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// 安装 Prometheus recorder
///
/// recorder 是进程级全局资源，重复安装会返回错误而不是 panic。
pub fn init() -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_notification_metrics();
    Ok(MetricsHandle { handle })
}

/// 注册通知相关指标的描述
fn describe_notification_metrics() {
    metrics::describe_counter!(
        "notifications_created_total",
        "Total number of notification records created"
    );
    metrics::describe_counter!(
        "notifications_rehydrated_total",
        "Total number of notification records rehydrated into views"
    );
    metrics::describe_counter!(
        "notification_rehydration_failures_total",
        "Total number of notification records skipped during rehydration"
    );
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录通知创建
#[inline]
pub fn record_notification_created(notification_type: &str) {
    metrics::counter!(
        "notifications_created_total",
        "type" => notification_type.to_string()
    )
    .increment(1);
}

/// 记录通知还原成功
#[inline]
pub fn record_notification_rehydrated(notification_type: &str) {
    metrics::counter!(
        "notifications_rehydrated_total",
        "type" => notification_type.to_string()
    )
    .increment(1);
}

/// 记录通知还原失败
///
/// reason 取值：unknown_type、codec、payload_schema
#[inline]
pub fn record_rehydration_failure(reason: &'static str) {
    metrics::counter!(
        "notification_rehydration_failures_total",
        "reason" => reason
    )
    .increment(1);
}
