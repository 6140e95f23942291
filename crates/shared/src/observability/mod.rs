//! 统一可观测性模块
//!
//! 提供 logging、metrics 的统一初始化和管理。
//! 所有入口通过单一入口点配置可观测性，确保一致的日志格式和指标命名。

pub mod metrics;
pub mod tracing;

use ::tracing::info;
use anyhow::Result;

pub use crate::config::ObservabilityConfig;

/// 可观测性资源守卫
///
/// 持有 metrics handle 的生命周期，供进程退出前输出指标快照。
pub struct ObservabilityGuard {
    metrics_handle: Option<metrics::MetricsHandle>,
}

impl ObservabilityGuard {
    /// 创建一个空的 Guard（用于测试或禁用可观测性时）
    pub fn empty() -> Self {
        Self {
            metrics_handle: None,
        }
    }

    /// 渲染当前指标快照，未启用 metrics 时返回 None
    pub fn render_metrics(&self) -> Option<String> {
        self.metrics_handle.as_ref().map(|handle| handle.render())
    }
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        info!("Shutting down observability...");
    }
}

/// 统一初始化可观测性
///
/// 初始化顺序：
/// 1. Tracing（日志）
/// 2. Metrics（Prometheus recorder，可通过配置关闭）
///
/// # Example
///
/// ```ignore
/// use notify_shared::config::AppConfig;
/// use notify_shared::observability;
///
/// let config = AppConfig::load("notification-center")?;
/// let obs_config = config.observability.clone().with_service_name(&config.service_name);
/// let _guard = observability::init(&obs_config)?;
/// ```
pub fn init(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    tracing::init(config)?;

    let metrics_handle = if config.metrics_enabled {
        Some(metrics::init()?)
    } else {
        None
    };

    info!(
        service = %config.service_name,
        log_format = %config.log_format,
        metrics_enabled = config.metrics_enabled,
        "Observability initialized"
    );

    Ok(ObservabilityGuard { metrics_handle })
}
