// ==========================================
// 校医院健康档案系统 - 导入批次相关值对象
// ==========================================
// 对齐: schema.sql import_batch / import_row_error 表
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ==========================================
// ImportCounts - 五类实体的新建计数
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCounts {
    pub students: usize,
    pub appointments: usize,
    pub consultations: usize,
    pub lab_tests: usize,
    pub bills: usize,
}

impl ImportCounts {
    pub fn merge(&mut self, other: &ImportCounts) {
        self.students += other.students;
        self.appointments += other.appointments;
        self.consultations += other.consultations;
        self.lab_tests += other.lab_tests;
        self.bills += other.bills;
    }

    pub fn total(&self) -> usize {
        self.students + self.appointments + self.consultations + self.lab_tests + self.bills
    }
}

// ==========================================
// RowErrorKind - 行级错误分类
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowErrorKind {
    MalformedRow,        // 字段缺失/无法解析
    ResolutionCollision, // 严格模式下的身份冲突
    Storage,             // 落库失败（约束违反等）
    Other,
}

impl RowErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowErrorKind::MalformedRow => "MALFORMED_ROW",
            RowErrorKind::ResolutionCollision => "RESOLUTION_COLLISION",
            RowErrorKind::Storage => "STORAGE",
            RowErrorKind::Other => "OTHER",
        }
    }
}

impl fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// RowError - 行级错误记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub row_index: usize, // 1 起始的数据行号
    pub kind: RowErrorKind,
    pub message: String,
}

// ==========================================
// CollisionNotice - 身份冲突记录
// ==========================================
// 两个不同的原始名称归一化到同一登录标识
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionNotice {
    pub row_index: usize,
    pub raw_name: String,        // 本行的原始名称
    pub username: String,        // 归一化后的登录标识
    pub existing_name: String,   // 已存在人员的名称
    pub existing_role: String,   // 已存在人员的角色
}

// ==========================================
// ImportReport - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub total_rows: usize,
    pub counts: ImportCounts,
    pub errors: Vec<RowError>,
    pub collisions: Vec<CollisionNotice>,
    pub elapsed: Duration,
}

impl ImportReport {
    pub fn failed_rows(&self) -> usize {
        self.errors.len()
    }

    pub fn has_row_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ==========================================
// ImportBatch - 导入批次台账
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub total_rows: usize,
    pub counts: ImportCounts,
    pub failed_rows: usize,
    pub collision_count: usize,
    pub row_commit_mode: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub elapsed_ms: i64,
}
