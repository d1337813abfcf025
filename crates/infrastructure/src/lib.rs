//! 基础设施层实现。
//!
//! 提供 PostgreSQL 消息日志适配器，实现应用层定义的 [`application::MessageLog`] 接口。

pub mod migrations;
pub mod repository;

pub use migrations::MIGRATOR;
pub use repository::{create_pg_pool, PgMessageLog};
