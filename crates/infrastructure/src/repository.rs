use application::MessageLog;
use async_trait::async_trait;
use domain::{ChatMessage, RepositoryError};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::storage(err.to_string())
}

#[derive(Debug, FromRow)]
struct MessageRecord {
    username: String,
    body: String,
}

impl From<MessageRecord> for ChatMessage {
    fn from(value: MessageRecord) -> Self {
        ChatMessage::from_parts(value.username, value.body)
    }
}

/// PostgreSQL 实现的消息日志，跨进程重启持久。
///
/// 顺序由 `seq` 决定；序列在失败插入时可能跳号，所以游标按行偏移而不是按 `seq` 计算。
/// 追加在表级锁下串行提交，保证 `seq` 顺序与提交顺序一致。
#[derive(Clone)]
pub struct PgMessageLog {
    pool: PgPool,
}

impl PgMessageLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageLog for PgMessageLog {
    async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        // EXCLUSIVE 与其他写入互斥但不阻塞读取：持锁期间分配的 seq 一定晚于所有已提交的行，
        // 也不会有更小的 seq 在之后提交，按行偏移的游标因此不会跳过或重复消息。
        sqlx::query(r#"LOCK TABLE chat_messages IN EXCLUSIVE MODE"#)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        sqlx::query(r#"INSERT INTO chat_messages (username, body) VALUES ($1, $2)"#)
            .bind(&message.username)
            .bind(&message.text)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<ChatMessage>, RepositoryError> {
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"SELECT username, body FROM chat_messages ORDER BY seq ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(ChatMessage::from).collect())
    }

    async fn entries_since(&self, position: usize) -> Result<Vec<ChatMessage>, RepositoryError> {
        let offset = i64::try_from(position)
            .map_err(|_| RepositoryError::storage("cursor position out of range"))?;
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"SELECT username, body FROM chat_messages ORDER BY seq ASC OFFSET $1"#,
        )
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(ChatMessage::from).collect())
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    tracing::info!(max_connections, "连接 PostgreSQL");
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
