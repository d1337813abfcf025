//! 广播流
//!
//! 每个订阅者持有私有游标，从位置 0 开始完整回放日志，然后按顺序推送新追加的消息。
//! 空闲时等待追加通知，轮询间隔作为兜底（日志也可能被其他进程写入）。
//! 流本身不会结束；丢弃流即取消订阅，不持有任何共享锁。

use std::pin::Pin;
use std::time::Duration;

use async_stream::try_stream;
use domain::ChatMessage;
use futures_util::Stream;

use crate::{error::ApplicationError, feed::MessageFeed};

pub type MessageStream =
    Pin<Box<dyn Stream<Item = Result<ChatMessage, ApplicationError>> + Send + 'static>>;

pub fn subscribe(feed: MessageFeed, poll_interval: Duration) -> MessageStream {
    Box::pin(try_stream! {
        let mut last_delivered_index: usize = 0;

        loop {
            let appended = feed.appended();
            tokio::pin!(appended);
            appended.as_mut().enable();

            let fresh = feed
                .entries_since(last_delivered_index)
                .await
                .map_err(ApplicationError::from)?;

            if fresh.is_empty() {
                tokio::select! {
                    _ = &mut appended => {}
                    _ = tokio::time::sleep(poll_interval) => {}
                }
                continue;
            }

            last_delivered_index += fresh.len();
            for message in fresh {
                yield message;
            }
        }
    })
}
