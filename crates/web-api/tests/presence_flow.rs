mod support;

use std::time::Duration;

use application::HeartbeatSettings;
use chat_client::{ChatClient, ClientError};
use tokio_util::sync::CancellationToken;

use support::spawn_server;

fn fast_heartbeat() -> HeartbeatSettings {
    HeartbeatSettings {
        timeout: Duration::from_millis(300),
        sweep_interval: Duration::from_millis(50),
    }
}

#[tokio::test]
async fn silent_client_is_evicted_and_learns_on_next_call() {
    let server = spawn_server(fast_heartbeat()).await;
    let alice = ChatClient::new(server.base_url(), "alice");

    alice.connect().await.unwrap();
    alice.send("hi").await.unwrap();

    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(server.registry.is_empty().await);

    match alice.send("hi2").await {
        Err(ClientError::NotConnected(text)) => {
            assert_eq!(text, "ERROR: User 'alice' is not connected.")
        }
        other => panic!("expected NotConnected, got {other:?}"),
    }

    // 被驱逐后用户名可以重新注册
    alice.connect().await.expect("reconnect after eviction");
}

#[tokio::test]
async fn heartbeating_client_stays_connected() {
    let server = spawn_server(fast_heartbeat()).await;
    let alice = ChatClient::new(server.base_url(), "alice");
    alice.connect().await.unwrap();

    let stop = CancellationToken::new();
    let heartbeat = alice.spawn_heartbeat(Duration::from_millis(60), stop.clone());

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(server.registry.len().await, 1);
    alice.send("still here").await.expect("send while heartbeating");

    stop.cancel();
    heartbeat.await.unwrap().expect("heartbeat loop ends cleanly");
}

#[tokio::test]
async fn heartbeat_loop_reports_eviction() {
    let server = spawn_server(fast_heartbeat()).await;
    let alice = ChatClient::new(server.base_url(), "alice");
    alice.connect().await.unwrap();

    // 首次心跳立即发送，之后的间隔远大于超时，会话必然被驱逐
    let heartbeat = alice.spawn_heartbeat(Duration::from_millis(800), CancellationToken::new());
    let outcome = tokio::time::timeout(Duration::from_secs(5), heartbeat)
        .await
        .expect("loop should stop")
        .unwrap();
    assert!(matches!(outcome, Err(ClientError::NotConnected(_))));
}

#[tokio::test]
async fn connected_users_are_listed() {
    let server = spawn_server(fast_heartbeat()).await;
    for name in ["bob", "alice"] {
        ChatClient::new(server.base_url(), name).connect().await.unwrap();
    }

    let names: Vec<String> = reqwest::get(format!("{}/api/v1/sessions", server.base_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(names, ["alice", "bob"]);
}
