//! 应用层实现。
//!
//! 会话注册表、心跳监控、请求分发以及广播流都在这里，
//! 对消息持久化只依赖 [`MessageLog`] 抽象，具体存储由基础设施层提供。

pub mod clock;
pub mod dispatcher;
pub mod error;
pub mod feed;
pub mod heartbeat;
pub mod message_log;
pub mod registry;
pub mod stream;

pub use clock::{Clock, SystemClock};
pub use dispatcher::RequestDispatcher;
pub use error::ApplicationError;
pub use feed::MessageFeed;
pub use heartbeat::{HeartbeatMonitor, HeartbeatSettings};
pub use message_log::{memory::InMemoryMessageLog, MessageLog};
pub use registry::SessionRegistry;
pub use stream::{subscribe, MessageStream};
