use std::{net::SocketAddr, sync::Arc, time::Duration};

use application::{
    HeartbeatMonitor, HeartbeatSettings, InMemoryMessageLog, MessageFeed, SessionRegistry,
    SystemClock,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use web_api::{router, AppState};

pub struct TestServer {
    pub addr: SocketAddr,
    pub registry: SessionRegistry,
    #[allow(dead_code)]
    pub state: AppState,
    pub shutdown: CancellationToken,
}

impl TestServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// 在随机端口上启动完整服务（内存日志 + 心跳监控）
pub async fn spawn_server(heartbeat: HeartbeatSettings) -> TestServer {
    let registry = SessionRegistry::new(Arc::new(SystemClock));
    let feed = MessageFeed::new(Arc::new(InMemoryMessageLog::new()));
    let shutdown = CancellationToken::new();

    HeartbeatMonitor::new(registry.clone(), heartbeat).spawn(shutdown.clone());

    let state = AppState::new(
        registry.clone(),
        feed,
        Duration::from_millis(20),
        shutdown.clone(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let server_shutdown = shutdown.clone();

    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
            .await
            .ok();
    });

    TestServer {
        addr,
        registry,
        state,
        shutdown,
    }
}

/// 心跳超时足够长，测试期间不会发生驱逐
#[allow(dead_code)]
pub fn relaxed_heartbeat() -> HeartbeatSettings {
    HeartbeatSettings {
        timeout: Duration::from_secs(60),
        sweep_interval: Duration::from_secs(1),
    }
}
