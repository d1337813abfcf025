use std::time::Duration;

use crate::value_objects::{Timestamp, Username};

/// 一个已连接客户端的服务端记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: Username,
    pub last_heartbeat: Timestamp,
}

impl Session {
    pub fn new(username: Username, now: Timestamp) -> Self {
        Self {
            username,
            last_heartbeat: now,
        }
    }

    pub fn touch(&mut self, now: Timestamp) {
        self.last_heartbeat = now;
    }

    /// 距上次心跳严格超过 `timeout` 才视为过期。
    pub fn is_stale(&self, now: Timestamp, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_heartbeat) > timeout
    }
}
