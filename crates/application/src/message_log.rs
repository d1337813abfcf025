use async_trait::async_trait;
use domain::{ChatMessage, RepositoryError};

/// 只追加的消息日志（存储协作方边界）。
///
/// `append` 与 `snapshot` 各自必须是原子的；顺序即插入顺序，已追加的条目不可修改或删除。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageLog: Send + Sync {
    async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError>;

    /// 按插入顺序返回完整日志
    async fn snapshot(&self) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// 返回位置 `position` 及之后的条目。适配器可以用范围查询覆盖默认实现。
    async fn entries_since(&self, position: usize) -> Result<Vec<ChatMessage>, RepositoryError> {
        let mut entries = self.snapshot().await?;
        let position = position.min(entries.len());
        Ok(entries.split_off(position))
    }
}

/// 内存实现的消息日志（用于测试和无持久化部署）
pub mod memory {
    use super::*;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct InMemoryMessageLog {
        entries: RwLock<Vec<ChatMessage>>,
    }

    impl InMemoryMessageLog {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl MessageLog for InMemoryMessageLog {
        async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
            self.entries.write().await.push(message.clone());
            Ok(())
        }

        async fn snapshot(&self) -> Result<Vec<ChatMessage>, RepositoryError> {
            Ok(self.entries.read().await.clone())
        }

        async fn entries_since(
            &self,
            position: usize,
        ) -> Result<Vec<ChatMessage>, RepositoryError> {
            let entries = self.entries.read().await;
            Ok(entries.get(position..).map(<[_]>::to_vec).unwrap_or_default())
        }
    }
}
