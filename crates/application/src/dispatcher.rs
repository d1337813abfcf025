//! 请求分发器
//!
//! 按意图把单次调用路由到会话注册表和/或消息日志。跨请求无状态，
//! 所有状态都在 [`SessionRegistry`] 中。

use domain::{ChatMessage, ChatRequest, Intent, Reply, Username};

use crate::{error::ApplicationError, feed::MessageFeed, registry::SessionRegistry};

pub struct RequestDispatcher {
    registry: SessionRegistry,
    feed: MessageFeed,
}

impl RequestDispatcher {
    pub fn new(registry: SessionRegistry, feed: MessageFeed) -> Self {
        Self { registry, feed }
    }

    /// 处理一次调用。
    ///
    /// `NameTaken`/`NotConnected` 作为应答值返回；只有参数错误和存储故障才是 `Err`。
    pub async fn dispatch(&self, request: ChatRequest) -> Result<Reply, ApplicationError> {
        let ChatRequest { username, intent } = request;
        match intent {
            Intent::Connect => Ok(self.connect(&username).await),
            Intent::Disconnect => Ok(self.disconnect(&username).await),
            Intent::Heartbeat => Ok(self.heartbeat(&username).await),
            Intent::Chat(text) => self.chat(&username, text).await,
        }
    }

    async fn connect(&self, username: &Username) -> Reply {
        match self.registry.register(username).await {
            Ok(()) => {
                tracing::info!(username = %username, "用户连接");
                Reply::connected(username.as_str())
            }
            Err(_) => {
                tracing::info!(username = %username, "用户名已被占用");
                Reply::name_taken(username.as_str())
            }
        }
    }

    async fn disconnect(&self, username: &Username) -> Reply {
        if self.registry.remove(username).await {
            tracing::info!(username = %username, "用户断开");
        }
        Reply::disconnected(username.as_str())
    }

    async fn heartbeat(&self, username: &Username) -> Reply {
        match self.registry.touch(username).await {
            Ok(()) => {
                tracing::trace!(username = %username, "收到心跳");
                Reply::heartbeat_ack(username.as_str())
            }
            Err(_) => Reply::not_connected(username.as_str()),
        }
    }

    async fn chat(&self, username: &Username, text: String) -> Result<Reply, ApplicationError> {
        let message = ChatMessage::compose(username, text)?;

        if self.registry.touch(username).await.is_err() {
            tracing::debug!(username = %username, "未连接用户尝试发言");
            return Ok(Reply::not_connected(username.as_str()));
        }

        self.feed.append(&message).await.map_err(|err| {
            tracing::error!(username = %username, error = %err, "消息持久化失败");
            ApplicationError::from(err)
        })?;

        tracing::debug!(username = %username, "消息已追加");
        Ok(Reply::echo(&message.username, &message.text))
    }
}
