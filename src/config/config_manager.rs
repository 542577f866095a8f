// ==========================================
// 校医院健康档案系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::{
    CollisionPolicy, ImportConfigReader, RowCommitMode, DEFAULT_LOCALE,
    DEFAULT_PROGRESS_INTERVAL,
};
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 打开数据库文件并创建 ConfigManager
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// global scope 的全部配置（按键排序）
    pub fn get_config_snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
impl ImportConfigReader for ConfigManager {
    fn get_progress_interval(&self) -> RepositoryResult<usize> {
        let value = self.get_config_or_default(
            config_keys::PROGRESS_INTERVAL,
            &DEFAULT_PROGRESS_INTERVAL.to_string(),
        )?;
        Ok(value.trim().parse::<usize>().unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::PROGRESS_INTERVAL,
                raw_value = %value,
                "进度间隔配置格式错误，使用默认值"
            );
            DEFAULT_PROGRESS_INTERVAL
        }))
    }

    fn get_collision_policy(&self) -> RepositoryResult<CollisionPolicy> {
        let value = self.get_config_or_default(config_keys::COLLISION_POLICY, "LENIENT")?;
        Ok(value.parse().unwrap_or_else(|e: String| {
            tracing::warn!(config_key = config_keys::COLLISION_POLICY, error = %e, "使用默认 LENIENT");
            CollisionPolicy::Lenient
        }))
    }

    fn get_row_commit_mode(&self) -> RepositoryResult<RowCommitMode> {
        let value = self.get_config_or_default(config_keys::ROW_COMMIT_MODE, "INCREMENTAL")?;
        Ok(value.parse().unwrap_or_else(|e: String| {
            tracing::warn!(config_key = config_keys::ROW_COMMIT_MODE, error = %e, "使用默认 INCREMENTAL");
            RowCommitMode::Incremental
        }))
    }

    fn get_fail_on_row_errors(&self) -> RepositoryResult<bool> {
        let value = self.get_config_or_default(config_keys::FAIL_ON_ROW_ERRORS, "false")?;
        Ok(matches!(
            value.trim().to_lowercase().as_str(),
            "true" | "1" | "yes"
        ))
    }

    fn get_locale(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::LOCALE, DEFAULT_LOCALE)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 导入
    pub const PROGRESS_INTERVAL: &str = "import.progress_interval";
    pub const COLLISION_POLICY: &str = "import.collision_policy";
    pub const ROW_COMMIT_MODE: &str = "import.row_commit_mode";
    pub const FAIL_ON_ROW_ERRORS: &str = "import.fail_on_row_errors";

    // 界面
    pub const LOCALE: &str = "ui.locale";
}
