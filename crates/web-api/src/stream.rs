//! WebSocket 广播流
//!
//! 每个连接一个广播流处理器：完整回放历史后推送新消息，每条消息一个 JSON 文本帧。
//! 客户端关闭连接或服务关闭时立即结束，不留下孤立的轮询任务。

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};

use crate::state::AppState;

pub(crate) async fn chat_stream(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| serve_stream(socket, state))
}

async fn serve_stream(socket: WebSocket, state: AppState) {
    let (mut sender, mut incoming) = socket.split();
    let mut messages = application::subscribe(state.feed.clone(), state.poll_interval);
    let mut delivered: u64 = 0;
    let _guard = state.track_stream();

    tracing::info!(open_streams = state.open_streams(), "广播流已建立");

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => {
                let _ = sender.send(WsMessage::Close(None)).await;
                break;
            }
            frame = incoming.next() => match frame {
                Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            next = messages.next() => match next {
                Some(Ok(message)) => {
                    let payload = match serde_json::to_string(&message) {
                        Ok(json) => json,
                        Err(err) => {
                            // 跳过会在游标之后留下空洞，直接断开让客户端重新订阅
                            tracing::error!(error = %err, "广播帧序列化失败");
                            break;
                        }
                    };
                    if sender.send(WsMessage::Text(payload.into())).await.is_err() {
                        break;
                    }
                    delivered += 1;
                    tracing::debug!(delivered, "广播帧已发送");
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "读取消息日志失败，关闭广播流");
                    break;
                }
                None => break,
            },
        }
    }

    tracing::info!(delivered, "广播流已关闭");
}
