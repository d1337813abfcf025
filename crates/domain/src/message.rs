use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::Username;

pub const MESSAGE_MAX_LEN: usize = 2000;

/// 一条聊天消息。在消息日志中的位置即其序号，追加后不可变。
///
/// 作者只需是合法用户名，不要求仍然在线（历史消息的作者可能早已离开）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub username: String,
    #[serde(rename = "message")]
    pub text: String,
}

impl ChatMessage {
    /// 构造一条待追加的用户消息，校验正文。
    pub fn compose(author: &Username, text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::invalid_argument("message", "cannot be empty"));
        }
        if text.chars().count() > MESSAGE_MAX_LEN {
            return Err(DomainError::invalid_argument("message", "too long"));
        }
        Ok(Self {
            username: author.as_str().to_owned(),
            text,
        })
    }

    /// 从存储中还原，不做校验。
    pub fn from_parts(username: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_keeps_text_verbatim() {
        let alice = Username::parse("alice").unwrap();
        let message = ChatMessage::compose(&alice, " hi there ").unwrap();
        assert_eq!(message.username, "alice");
        assert_eq!(message.text, " hi there ");
    }

    #[test]
    fn blank_text_is_rejected() {
        let alice = Username::parse("alice").unwrap();
        assert!(ChatMessage::compose(&alice, "\n\t ").is_err());
    }

    #[test]
    fn overlong_text_is_rejected() {
        let alice = Username::parse("alice").unwrap();
        assert!(ChatMessage::compose(&alice, "a".repeat(MESSAGE_MAX_LEN + 1)).is_err());
    }
}
