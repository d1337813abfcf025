//! 统一配置中心
//!
//! 加载顺序：内置默认值 -> 可选配置文件（`APP_CONFIG_FILE`）-> 环境变量（`APP_*`，嵌套键用 `__` 分隔）。
//! 提供：
//! - 服务监听地址
//! - 消息日志存储
//! - 心跳与驱逐节奏
//! - 广播流轮询间隔

use std::time::Duration;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub presence: PresenceConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

/// 服务器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// 进程内日志，重启后丢失
    #[default]
    Memory,
    Postgres,
}

/// 消息日志存储配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default)]
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            url: None,
            max_connections: 5,
        }
    }
}

/// 在线状态配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceConfig {
    pub heartbeat_timeout_ms: u64,
    /// 客户端发送心跳的间隔，超时必须至少是它的两倍
    pub client_heartbeat_interval_ms: u64,
    pub sweep_interval_ms: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            heartbeat_timeout_ms: 10_000,
            client_heartbeat_interval_ms: 3_000,
            sweep_interval_ms: 1_000,
        }
    }
}

impl PresenceConfig {
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }

    pub fn client_heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.client_heartbeat_interval_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

/// 广播流配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    pub poll_interval_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
        }
    }
}

impl StreamConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl AppConfig {
    /// 默认值 -> APP_CONFIG_FILE -> APP_* 环境变量
    pub fn figment() -> Figment {
        let mut fig = Figment::new().merge(Serialized::defaults(AppConfig::default()));
        if let Ok(path) = std::env::var("APP_CONFIG_FILE") {
            if path.ends_with(".yml") || path.ends_with(".yaml") {
                fig = fig.merge(Yaml::file(path));
            } else if path.ends_with(".json") {
                fig = fig.merge(Json::file(path));
            } else {
                fig = fig.merge(Toml::file(path));
            }
        }
        fig.merge(Env::prefixed("APP_").split("__"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: AppConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidServerConfig(
                "host cannot be empty".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidServerConfig(
                "port must be greater than 0".to_string(),
            ));
        }

        if self.storage.backend == StorageBackend::Postgres {
            let has_url = self
                .storage
                .url
                .as_deref()
                .is_some_and(|url| !url.trim().is_empty());
            if !has_url {
                return Err(ConfigError::InvalidStorageConfig(
                    "postgres backend requires storage.url".to_string(),
                ));
            }
            if self.storage.max_connections == 0 {
                return Err(ConfigError::InvalidStorageConfig(
                    "max_connections must be greater than 0".to_string(),
                ));
            }
        }

        let presence = &self.presence;
        if presence.heartbeat_timeout_ms == 0
            || presence.client_heartbeat_interval_ms == 0
            || presence.sweep_interval_ms == 0
        {
            return Err(ConfigError::InvalidPresenceConfig(
                "intervals must be greater than 0".to_string(),
            ));
        }
        // 超时与心跳间隔相等时，调度抖动就会造成误驱逐
        if presence.heartbeat_timeout_ms < presence.client_heartbeat_interval_ms.saturating_mul(2)
        {
            return Err(ConfigError::InvalidPresenceConfig(format!(
                "heartbeat_timeout_ms ({}) must be at least twice client_heartbeat_interval_ms ({})",
                presence.heartbeat_timeout_ms, presence.client_heartbeat_interval_ms
            )));
        }

        if self.stream.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidStreamConfig(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// 脱敏后的配置摘要（用于日志）
    pub fn sanitize(&self) -> String {
        let mut redacted = self.clone();
        if let Some(url) = redacted.storage.url.as_mut() {
            if let Some(at) = url.rfind('@') {
                let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
                if scheme_end <= at {
                    url.replace_range(scheme_end..at, "[REDACTED]");
                }
            }
        }
        format!("{redacted:?}")
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("Invalid server configuration: {0}")]
    InvalidServerConfig(String),
    #[error("Invalid storage configuration: {0}")]
    InvalidStorageConfig(String),
    #[error("Invalid presence configuration: {0}")]
    InvalidPresenceConfig(String),
    #[error("Invalid stream configuration: {0}")]
    InvalidStreamConfig(String),
}
