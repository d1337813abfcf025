use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use domain::{DomainError, Session, Username};
use tokio::sync::Mutex;

use crate::clock::Clock;

/// 在线会话注册表：谁在线的唯一事实来源。
///
/// 所有读写都在同一把互斥锁内完成，临界区只做内存映射操作，不做任何 I/O。
/// 克隆只复制句柄，分发器、心跳监控和测试共享同一份状态。
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Username, Session>>>,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// 用户名未被占用时创建会话，否则返回 `NameTaken`。
    pub async fn register(&self, username: &Username) -> Result<(), DomainError> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(username) {
            return Err(DomainError::name_taken(username.as_str()));
        }
        sessions.insert(username.clone(), Session::new(username.clone(), now));
        Ok(())
    }

    /// 刷新心跳时间；没有会话时返回 `NotConnected`。
    pub async fn touch(&self, username: &Username) -> Result<(), DomainError> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(username) {
            Some(session) => {
                session.touch(now);
                Ok(())
            }
            None => Err(DomainError::not_connected(username.as_str())),
        }
    }

    /// 幂等删除，返回会话此前是否存在。
    pub async fn remove(&self, username: &Username) -> bool {
        self.sessions.lock().await.remove(username).is_some()
    }

    /// 时间点一致的在线用户视图
    pub async fn snapshot(&self) -> BTreeSet<Username> {
        self.sessions.lock().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 在同一个临界区内找出并删除所有心跳超时的会话。
    ///
    /// 收集与删除不能拆成两次加锁，否则两次之间到达的心跳会被误驱逐。
    pub async fn evict_stale(&self, timeout: Duration) -> Vec<Username> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;
        let stale: Vec<Username> = sessions
            .values()
            .filter(|session| session.is_stale(now, timeout))
            .map(|session| session.username.clone())
            .collect();
        for username in &stale {
            sessions.remove(username);
        }
        stale
    }
}
