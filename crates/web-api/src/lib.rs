//! Web API 层。
//!
//! 提供 Axum 路由：单次调用 `SendMessage`（意图通过 `message-type` 头携带）、
//! WebSocket 广播流 `ChatStream`、在线会话查询与健康检查。

mod error;
mod routes;
mod state;
mod stream;

pub use error::ApiError;
pub use domain::INTENT_HEADER;
pub use routes::router;
pub use state::AppState;
