use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use application::{MessageFeed, RequestDispatcher, SessionRegistry};
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<RequestDispatcher>,
    pub registry: SessionRegistry,
    pub feed: MessageFeed,
    /// 广播流空闲时的兜底轮询间隔
    pub poll_interval: Duration,
    /// 服务关闭时取消，结束所有广播流
    pub shutdown: CancellationToken,
    open_streams: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(
        registry: SessionRegistry,
        feed: MessageFeed,
        poll_interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        let dispatcher = Arc::new(RequestDispatcher::new(registry.clone(), feed.clone()));
        Self {
            dispatcher,
            registry,
            feed,
            poll_interval,
            shutdown,
            open_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 当前仍在运行的广播流处理器数量
    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }

    pub(crate) fn track_stream(&self) -> StreamGuard {
        self.open_streams.fetch_add(1, Ordering::SeqCst);
        StreamGuard {
            open_streams: self.open_streams.clone(),
        }
    }
}

/// 广播流处理器退出时自动减少计数
pub(crate) struct StreamGuard {
    open_streams: Arc<AtomicUsize>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.open_streams.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use application::{InMemoryMessageLog, SystemClock};

    use super::*;

    #[test]
    fn stream_guard_tracks_open_handlers() {
        let state = AppState::new(
            SessionRegistry::new(Arc::new(SystemClock)),
            MessageFeed::new(Arc::new(InMemoryMessageLog::new())),
            Duration::from_millis(50),
            CancellationToken::new(),
        );

        let first = state.track_stream();
        let second = state.clone().track_stream();
        assert_eq!(state.open_streams(), 2);

        drop(first);
        assert_eq!(state.open_streams(), 1);
        drop(second);
        assert_eq!(state.open_streams(), 0);
    }
}
