// ==========================================
// 校医院健康档案系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口与选项值对象
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 默认进度输出间隔（行）
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;

/// 默认界面语言
pub const DEFAULT_LOCALE: &str = "en";

// ==========================================
// CollisionPolicy - 身份冲突处理策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollisionPolicy {
    /// 绑定到已有人员，仅计数并告警
    #[default]
    Lenient,
    /// 本行失败（ResolutionCollision）
    Strict,
}

impl CollisionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionPolicy::Lenient => "LENIENT",
            CollisionPolicy::Strict => "STRICT",
        }
    }
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LENIENT" => Ok(CollisionPolicy::Lenient),
            "STRICT" => Ok(CollisionPolicy::Strict),
            other => Err(format!("未知冲突策略: {}", other)),
        }
    }
}

// ==========================================
// RowCommitMode - 行提交模式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowCommitMode {
    /// 逐条写入，失败行已写入的实体保留
    #[default]
    Incremental,
    /// 每行一个 SAVEPOINT，失败行不留任何实体
    Atomic,
}

impl RowCommitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowCommitMode::Incremental => "INCREMENTAL",
            RowCommitMode::Atomic => "ATOMIC",
        }
    }
}

impl fmt::Display for RowCommitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowCommitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INCREMENTAL" => Ok(RowCommitMode::Incremental),
            "ATOMIC" => Ok(RowCommitMode::Atomic),
            other => Err(format!("未知行提交模式: {}", other)),
        }
    }
}

// ==========================================
// ImportOptions - 一次导入的最终选项
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    pub progress_interval: usize, // 0 = 不输出进度
    pub collision_policy: CollisionPolicy,
    pub row_commit_mode: RowCommitMode,
    pub fail_on_row_errors: bool,
    pub locale: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            collision_policy: CollisionPolicy::Lenient,
            row_commit_mode: RowCommitMode::Incremental,
            fail_on_row_errors: false,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ImportConfigReader {
    /// 进度输出间隔
    ///
    /// # 默认值
    /// - 1000
    fn get_progress_interval(&self) -> RepositoryResult<usize>;

    /// 身份冲突策略
    ///
    /// # 默认值
    /// - LENIENT
    fn get_collision_policy(&self) -> RepositoryResult<CollisionPolicy>;

    /// 行提交模式
    ///
    /// # 默认值
    /// - INCREMENTAL
    fn get_row_commit_mode(&self) -> RepositoryResult<RowCommitMode>;

    /// 存在失败行时是否以非零状态退出
    ///
    /// # 默认值
    /// - false
    fn get_fail_on_row_errors(&self) -> RepositoryResult<bool>;

    /// 摘要输出语言
    ///
    /// # 默认值
    /// - en
    fn get_locale(&self) -> RepositoryResult<String>;

    /// 汇总为 ImportOptions
    fn load_import_options(&self) -> RepositoryResult<ImportOptions> {
        Ok(ImportOptions {
            progress_interval: self.get_progress_interval()?,
            collision_policy: self.get_collision_policy()?,
            row_commit_mode: self.get_row_commit_mode()?,
            fail_on_row_errors: self.get_fail_on_row_errors()?,
            locale: self.get_locale()?,
        })
    }
}
