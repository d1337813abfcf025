//! 主应用程序入口
//!
//! 加载配置，选择消息日志存储，启动心跳监控与 Axum Web API 服务。

use std::sync::Arc;

use anyhow::Context;
use application::{
    HeartbeatMonitor, HeartbeatSettings, InMemoryMessageLog, MessageFeed, MessageLog,
    SessionRegistry, SystemClock,
};
use config::{AppConfig, StorageBackend, StorageConfig};
use infrastructure::{create_pg_pool, PgMessageLog, MIGRATOR};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("加载配置失败")?;
    tracing::info!(config = %config.sanitize(), "配置已加载");

    let log = open_message_log(&config.storage).await?;
    let registry = SessionRegistry::new(Arc::new(SystemClock));
    let feed = MessageFeed::new(log);
    let shutdown = CancellationToken::new();

    let monitor = HeartbeatMonitor::new(
        registry.clone(),
        HeartbeatSettings {
            timeout: config.presence.heartbeat_timeout(),
            sweep_interval: config.presence.sweep_interval(),
        },
    )
    .spawn(shutdown.clone());

    let state = AppState::new(
        registry,
        feed,
        config.stream.poll_interval(),
        shutdown.clone(),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("无法绑定地址 {addr}"))?;
    tracing::info!("聊天室服务器启动在 http://{}", addr);

    let signal_token = shutdown.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "监听退出信号失败");
            }
            tracing::info!("收到退出信号，正在关闭");
            signal_token.cancel();
        })
        .await?;

    // 监听器异常退出时也要停止后台任务
    shutdown.cancel();
    monitor.await.context("心跳监控任务异常退出")?;
    tracing::info!("服务已停止");

    Ok(())
}

async fn open_message_log(storage: &StorageConfig) -> anyhow::Result<Arc<dyn MessageLog>> {
    match storage.backend {
        StorageBackend::Memory => {
            tracing::info!("使用内存消息日志，重启后历史消息不保留");
            Ok(Arc::new(InMemoryMessageLog::new()))
        }
        StorageBackend::Postgres => {
            let url = storage
                .url
                .as_deref()
                .context("storage.url is required for the postgres backend")?;
            let pool = create_pg_pool(url, storage.max_connections).await?;
            MIGRATOR.run(&pool).await.context("数据库迁移失败")?;
            Ok(Arc::new(PgMessageLog::new(pool)))
        }
    }
}
