//! 领域模型错误定义
//!
//! 业务规则错误（用户名占用、未连接）与存储错误分开定义，
//! 调用方可以据此区分“应答值”与“基础设施故障”。

use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 用户名已被活跃会话占用
    #[error("username '{username}' is already taken")]
    NameTaken { username: String },

    /// 用户没有活跃会话（从未连接或已被心跳超时驱逐）
    #[error("user '{username}' is not connected")]
    NotConnected { username: String },

    /// 参数校验失败
    #[error("invalid argument {field}: {reason}")]
    InvalidArgument { field: String, reason: String },
}

impl DomainError {
    pub fn name_taken(username: impl Into<String>) -> Self {
        Self::NameTaken {
            username: username.into(),
        }
    }

    pub fn not_connected(username: impl Into<String>) -> Self {
        Self::NotConnected {
            username: username.into(),
        }
    }

    /// 创建参数校验错误
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 消息日志（存储协作方）错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
