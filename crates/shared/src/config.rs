//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// 负载编解码配置
///
/// 通知负载在落库前会经过压缩，算法和参数在此配置。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// 压缩算法：brotli 或 identity（不压缩，仅用于开发排查）
    pub algorithm: String,
    /// brotli 压缩质量，取值 0..=11
    pub quality: u32,
    /// brotli 窗口大小（以 2 为底的位数），取值 10..=24
    pub window_bits: u32,
    /// 解压后负载的最大字节数，超出视为损坏记录
    pub max_blob_bytes: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            algorithm: "brotli".to_string(),
            quality: 5,
            window_bits: 22,
            max_blob_bytes: 1024 * 1024,
        }
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 服务名称，用于标识日志和指标的来源
    pub service_name: String,
    pub log_level: String,
    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub log_format: String,
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown-service".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
        }
    }
}

impl ObservabilityConfig {
    /// 注入服务名，未单独配置时沿用 AppConfig 的 service_name
    pub fn with_service_name(mut self, service_name: &str) -> Self {
        self.service_name = service_name.to_string();
        self
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub codec: CodecConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（NOTIFY_ 前缀，层级用双下划线，如 NOTIFY_CODEC__QUALITY -> codec.quality）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("NOTIFY_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(Path::new(&config_dir), service_name, &env)
    }

    /// 从指定目录加载，便于测试时绕开进程级环境变量
    pub fn load_from(config_dir: &Path, service_name: &str, env: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{env}.toml"))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{service_name}.toml"))).required(false),
            )
            // 单下划线会与字段名（如 max_blob_bytes）冲突，层级分隔使用双下划线
            .add_source(
                Environment::with_prefix("NOTIFY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
