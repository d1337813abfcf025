//! 心跳监控
//!
//! 按固定节奏扫描会话注册表，驱逐心跳超时的会话。驱逐是唯一由服务端发起的断开，
//! 被驱逐的客户端只会在下一次心跳或发言时收到 `NotConnected`。

use std::time::Duration;

use domain::Username;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::registry::SessionRegistry;

/// 心跳监控配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatSettings {
    /// 超过该时长未收到心跳即驱逐，必须明显大于客户端心跳间隔
    pub timeout: Duration,
    /// 扫描间隔，与客户端心跳节奏无关
    pub sweep_interval: Duration,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(1),
        }
    }
}

pub struct HeartbeatMonitor {
    registry: SessionRegistry,
    settings: HeartbeatSettings,
}

impl HeartbeatMonitor {
    pub fn new(registry: SessionRegistry, settings: HeartbeatSettings) -> Self {
        Self { registry, settings }
    }

    /// 执行一次扫描，返回被驱逐的用户
    pub async fn sweep(&self) -> Vec<Username> {
        let evicted = self.registry.evict_stale(self.settings.timeout).await;
        for username in &evicted {
            tracing::info!(
                username = %username,
                timeout_ms = self.settings.timeout.as_millis() as u64,
                "心跳超时，驱逐会话"
            );
        }
        evicted
    }

    /// 启动后台扫描任务，`shutdown` 取消后退出
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.settings.sweep_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                timeout_ms = self.settings.timeout.as_millis() as u64,
                sweep_interval_ms = self.settings.sweep_interval.as_millis() as u64,
                "心跳监控已启动"
            );

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        self.sweep().await;
                    }
                }
            }

            tracing::info!("心跳监控已停止");
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::SystemClock;

    fn name(value: &str) -> Username {
        Username::parse(value).unwrap()
    }

    fn settings() -> HeartbeatSettings {
        HeartbeatSettings {
            timeout: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(1),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_evicts_only_after_timeout() {
        let registry = SessionRegistry::new(Arc::new(SystemClock));
        let monitor = HeartbeatMonitor::new(registry.clone(), settings());
        registry.register(&name("alice")).await.unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(monitor.sweep().await.is_empty());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(monitor.sweep().await, vec![name("alice")]);
        assert!(registry.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn refreshed_session_survives_many_sweeps() {
        let registry = SessionRegistry::new(Arc::new(SystemClock));
        let monitor = HeartbeatMonitor::new(registry.clone(), settings());
        registry.register(&name("alice")).await.unwrap();

        for _ in 0..10 {
            tokio::time::advance(Duration::from_secs(3)).await;
            registry.touch(&name("alice")).await.unwrap();
            assert!(monitor.sweep().await.is_empty());
        }
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn background_task_evicts_and_stops_on_shutdown() {
        let registry = SessionRegistry::new(Arc::new(SystemClock));
        registry.register(&name("alice")).await.unwrap();

        let shutdown = CancellationToken::new();
        let handle = HeartbeatMonitor::new(registry.clone(), settings()).spawn(shutdown.clone());

        tokio::time::sleep(Duration::from_secs(12)).await;
        assert!(registry.is_empty().await);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
