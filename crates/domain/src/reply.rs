use serde::{Deserialize, Serialize};

use crate::value_objects::SYSTEM_AUTHOR;

/// 单次调用的业务结果。所有业务规则错误都以值的形式返回，而不是传输层故障。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    Ok,
    NameTaken,
    NotConnected,
}

/// 调用应答：作者 + 正文 + 状态。线上字段沿用 `username`/`message`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(rename = "username")]
    pub author: String,
    #[serde(rename = "message")]
    pub text: String,
    pub status: ReplyStatus,
}

impl Reply {
    pub fn system(text: impl Into<String>, status: ReplyStatus) -> Self {
        Self {
            author: SYSTEM_AUTHOR.to_owned(),
            text: text.into(),
            status,
        }
    }

    pub fn connected(username: &str) -> Self {
        Self::system(
            format!("SUCCESS: Connected as '{username}'."),
            ReplyStatus::Ok,
        )
    }

    pub fn name_taken(username: &str) -> Self {
        Self::system(
            format!("ERROR: Username '{username}' is already taken."),
            ReplyStatus::NameTaken,
        )
    }

    pub fn disconnected(username: &str) -> Self {
        Self::system(
            format!("User '{username}' has disconnected."),
            ReplyStatus::Ok,
        )
    }

    pub fn heartbeat_ack(username: &str) -> Self {
        Self::system(
            format!("OK: Heartbeat received from '{username}'."),
            ReplyStatus::Ok,
        )
    }

    pub fn not_connected(username: &str) -> Self {
        Self::system(
            format!("ERROR: User '{username}' is not connected."),
            ReplyStatus::NotConnected,
        )
    }

    /// 聊天成功时回显原消息
    pub fn echo(username: &str, text: &str) -> Self {
        Self {
            author: username.to_owned(),
            text: text.to_owned(),
            status: ReplyStatus::Ok,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ReplyStatus::Ok
    }
}
