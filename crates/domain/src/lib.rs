//! 聊天室核心领域模型
//!
//! 包含用户名、会话、聊天消息以及带意图标签的请求，不涉及任何 I/O。

pub mod errors;
pub mod message;
pub mod reply;
pub mod request;
pub mod session;
pub mod value_objects;

// 重新导出常用类型
pub use errors::*;
pub use message::*;
pub use reply::*;
pub use request::*;
pub use session::*;
pub use value_objects::*;
