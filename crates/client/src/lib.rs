//! 聊天室客户端 SDK
//!
//! 封装单次调用（connect / disconnect / heartbeat / chat）与广播流订阅，
//! 把服务端的应答值映射为带类型的 [`ClientError`]。不做任何内部重试。

mod client;
mod error;

pub use client::{ChatClient, ChatStream};
pub use error::ClientError;
