use std::pin::Pin;
use std::time::Duration;

use domain::{ChatMessage, Intent, Reply, ReplyStatus, INTENT_HEADER, SYSTEM_AUTHOR};
use futures_util::{Stream, StreamExt};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

/// 广播流：按日志顺序产出聊天消息，系统消息已被过滤
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<ChatMessage, ClientError>> + Send>>;

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    username: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// 以某个用户名身份访问聊天服务
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
}

impl ChatClient {
    /// `base_url` 形如 `http://127.0.0.1:50051`
    pub fn new(base_url: impl Into<String>, username: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub async fn connect(&self) -> Result<Reply, ClientError> {
        self.call(Intent::CONNECT_TAG, "").await
    }

    pub async fn disconnect(&self) -> Result<Reply, ClientError> {
        self.call(Intent::DISCONNECT_TAG, "").await
    }

    pub async fn heartbeat(&self) -> Result<Reply, ClientError> {
        self.call(Intent::HEARTBEAT_TAG, "").await
    }

    pub async fn send(&self, text: &str) -> Result<Reply, ClientError> {
        self.call(Intent::CHAT_TAG, text).await
    }

    async fn call(&self, intent: &'static str, text: &str) -> Result<Reply, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/v1/messages", self.base_url))
            .header(INTENT_HEADER, intent)
            .json(&SendMessageBody {
                username: &self.username,
                message: text,
            })
            .send()
            .await
            .map_err(ClientError::transport)?;

        let status = response.status();
        if status.is_success() {
            let reply: Reply = response.json().await.map_err(ClientError::protocol)?;
            return match reply.status {
                ReplyStatus::Ok => Ok(reply),
                ReplyStatus::NameTaken => Err(ClientError::NameTaken(reply.text)),
                ReplyStatus::NotConnected => Err(ClientError::NotConnected(reply.text)),
            };
        }

        if status.is_client_error() {
            let body = response.text().await.map_err(ClientError::transport)?;
            return Err(rejection(status, body));
        }

        Err(server_fault(status))
    }

    /// 打开广播流。新订阅总是从头回放全部历史。
    pub async fn subscribe(&self) -> Result<ChatStream, ClientError> {
        let url = format!("{}/api/v1/stream", websocket_base(&self.base_url));
        let (socket, _response) = connect_async(url.as_str())
            .await
            .map_err(ClientError::transport)?;

        tracing::debug!(url = %url, "已订阅广播流");

        let stream = socket.filter_map(|frame| async move {
            match frame {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ChatMessage>(text.as_str()) {
                        Ok(message) if message.username == SYSTEM_AUTHOR => None,
                        Ok(message) => Some(Ok(message)),
                        Err(err) => Some(Err(ClientError::protocol(err))),
                    }
                }
                Ok(_) => None,
                Err(err) => Some(Err(ClientError::transport(err))),
            }
        });
        Ok(Box::pin(stream))
    }

    /// 后台定时发送心跳，直到取消或服务端报告未连接（已被驱逐）。
    ///
    /// 传输失败只记录日志，下一次心跳照常发送。
    pub fn spawn_heartbeat(
        &self,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<Result<(), ClientError>> {
        let client = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => return Ok(()),
                    _ = ticker.tick() => {}
                }

                match client.heartbeat().await {
                    Ok(_) => {}
                    Err(err @ ClientError::NotConnected(_)) => {
                        tracing::warn!(username = %client.username, "心跳被拒绝，会话已不存在");
                        return Err(err);
                    }
                    Err(err) => {
                        tracing::warn!(username = %client.username, error = %err, "心跳发送失败");
                    }
                }
            }
        })
    }
}

fn server_fault(status: StatusCode) -> ClientError {
    ClientError::TransportUnavailable(format!("server returned {status}"))
}

/// 4xx 应答：优先解析服务端的错误体，框架层拒绝（如请求体无法解析）时退回到状态码和原文。
fn rejection(status: StatusCode, body: String) -> ClientError {
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => ClientError::Rejected {
            code: parsed.code,
            message: parsed.message,
        },
        Err(_) => ClientError::Rejected {
            code: status.to_string(),
            message: body,
        },
    }
}

fn websocket_base(base_url: &str) -> String {
    if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base_url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn websocket_base_swaps_scheme() {
        assert_eq!(websocket_base("http://localhost:50051"), "ws://localhost:50051");
        assert_eq!(websocket_base("https://chat.example"), "wss://chat.example");
        assert_eq!(websocket_base("ws://already"), "ws://already");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ChatClient::new("http://localhost:50051/", "alice");
        assert_eq!(client.base_url, "http://localhost:50051");
        assert_eq!(client.username(), "alice");
    }

    #[test]
    fn structured_rejection_keeps_the_server_code() {
        let body = r#"{"code":"INVALID_ARGUMENT","message":"message: cannot be empty"}"#;
        match rejection(StatusCode::BAD_REQUEST, body.to_string()) {
            ClientError::Rejected { code, message } => {
                assert_eq!(code, "INVALID_ARGUMENT");
                assert_eq!(message, "message: cannot be empty");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn plain_text_rejection_falls_back_to_status() {
        let body = "Failed to deserialize the JSON body into the target type".to_string();
        match rejection(StatusCode::UNPROCESSABLE_ENTITY, body.clone()) {
            ClientError::Rejected { code, message } => {
                assert_eq!(code, "422 Unprocessable Entity");
                assert_eq!(message, body);
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // 绑定后立即释放端口，确保没有监听者
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ChatClient::new(format!("http://{addr}"), "alice");
        assert!(matches!(
            client.connect().await,
            Err(ClientError::TransportUnavailable(_))
        ));
        assert!(matches!(
            client.subscribe().await,
            Err(ClientError::TransportUnavailable(_))
        ));
    }
}
