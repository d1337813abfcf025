//! 带意图标签的单次请求
//!
//! 意图标签通过带外元数据传递，这里将其建模为和类型，避免字符串匹配散落各处。

use std::fmt;

use crate::errors::DomainError;
use crate::value_objects::Username;

/// 携带请求意图的带外元数据键，与消息正文分离，避免与内容冲突
pub const INTENT_HEADER: &str = "message-type";

/// 请求意图
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Connect,
    Disconnect,
    Heartbeat,
    Chat(String),
}

impl Intent {
    pub const CONNECT_TAG: &'static str = "connect";
    pub const DISCONNECT_TAG: &'static str = "disconnect";
    pub const HEARTBEAT_TAG: &'static str = "heartbeat";
    pub const CHAT_TAG: &'static str = "chat";

    /// 根据带外标签和消息正文构造意图，缺省标签视为聊天。
    pub fn from_tag(tag: Option<&str>, text: String) -> Result<Self, DomainError> {
        match tag.map(str::trim) {
            None | Some("") => Ok(Self::Chat(text)),
            Some(tag) if tag.eq_ignore_ascii_case(Self::CHAT_TAG) => Ok(Self::Chat(text)),
            Some(tag) if tag.eq_ignore_ascii_case(Self::CONNECT_TAG) => Ok(Self::Connect),
            Some(tag) if tag.eq_ignore_ascii_case(Self::DISCONNECT_TAG) => Ok(Self::Disconnect),
            Some(tag) if tag.eq_ignore_ascii_case(Self::HEARTBEAT_TAG) => Ok(Self::Heartbeat),
            Some(other) => Err(DomainError::invalid_argument(
                "message-type",
                format!("unknown intent '{other}'"),
            )),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Connect => Self::CONNECT_TAG,
            Self::Disconnect => Self::DISCONNECT_TAG,
            Self::Heartbeat => Self::HEARTBEAT_TAG,
            Self::Chat(_) => Self::CHAT_TAG,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// 一次单向调用：谁、想做什么。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub username: Username,
    pub intent: Intent,
}

impl ChatRequest {
    pub fn new(username: Username, intent: Intent) -> Self {
        Self { username, intent }
    }
}
