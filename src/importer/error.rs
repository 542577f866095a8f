// ==========================================
// 校医院健康档案系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分级: SourceUnavailable/UnsupportedFormat 为致命错误，其余止于行边界
// ==========================================

use crate::domain::{MoneyError, RowErrorKind};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误（致命）=====
    #[error("数据源不可用: {path}: {message}")]
    SourceUnavailable { path: String, message: String },

    #[error("文件格式不支持: {0}（仅支持 .csv/.xlsx/.xls）")]
    UnsupportedFormat(String),

    // ===== 行级错误 =====
    #[error("{field}: {message}")]
    MalformedRow { field: String, message: String },

    #[error("身份冲突: '{raw_name}' 归一化为已有用户 '{username}' ({existing_name}, {existing_role})")]
    ResolutionCollision {
        raw_name: String,
        username: String,
        existing_name: String,
        existing_role: String,
    },

    #[error(transparent)]
    Storage(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    pub fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        ImportError::MalformedRow {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 是否为致命错误（中止整个批次）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ImportError::SourceUnavailable { .. } | ImportError::UnsupportedFormat(_)
        )
    }

    /// 行级错误分类
    pub fn row_error_kind(&self) -> RowErrorKind {
        match self {
            ImportError::MalformedRow { .. } => RowErrorKind::MalformedRow,
            ImportError::ResolutionCollision { .. } => RowErrorKind::ResolutionCollision,
            ImportError::Storage(_) => RowErrorKind::Storage,
            _ => RowErrorKind::Other,
        }
    }
}

// 实现 From<csv::Error>（记录级解析失败）
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::malformed("record", err.to_string())
    }
}

// 实现 From<MoneyError>
impl From<MoneyError> for ImportError {
    fn from(err: MoneyError) -> Self {
        ImportError::malformed("amount", err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
