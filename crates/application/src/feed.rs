use std::sync::Arc;

use domain::{ChatMessage, RepositoryError};
use tokio::sync::{futures::Notified, Notify};

use crate::message_log::MessageLog;

/// 消息日志 + 追加通知。
///
/// 分发器通过它追加消息，广播流通过它读取并等待新消息，
/// 避免每个订阅者在空闲时也按固定间隔全量扫描日志。
#[derive(Clone)]
pub struct MessageFeed {
    log: Arc<dyn MessageLog>,
    appended: Arc<Notify>,
}

impl MessageFeed {
    pub fn new(log: Arc<dyn MessageLog>) -> Self {
        Self {
            log,
            appended: Arc::new(Notify::new()),
        }
    }

    pub async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        self.log.append(message).await?;
        self.appended.notify_waiters();
        Ok(())
    }

    pub async fn entries_since(&self, position: usize) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.log.entries_since(position).await
    }

    /// 下一次追加的通知。调用方需在读取日志之前 `enable`，以免错过读取期间的追加。
    pub fn appended(&self) -> Notified<'_> {
        self.appended.notified()
    }
}
