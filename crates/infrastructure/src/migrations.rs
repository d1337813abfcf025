use sqlx::migrate::Migrator;

/// 嵌入式数据库迁移
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");
