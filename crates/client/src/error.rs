use thiserror::Error;

/// 客户端错误类型
///
/// `NameTaken` 与 `NotConnected` 是服务端的业务应答；`TransportUnavailable` 表示连不上服务端，
/// 两类错误互不混淆，调用方可以分别处理（重新注册 / 提示断线）。
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    NameTaken(String),

    #[error("{0}")]
    NotConnected(String),

    /// 请求被服务端拒绝（参数非法等）
    #[error("request rejected ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    /// 服务端返回了无法解析的内容
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ClientError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::TransportUnavailable(err.to_string())
    }

    pub fn protocol(err: impl std::fmt::Display) -> Self {
        Self::Protocol(err.to_string())
    }
}
