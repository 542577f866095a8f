// ==========================================
// 校医院健康档案系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 健康档案批量导入（CSV/Excel → 关系库）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 导入选项
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    Appointment, AppointmentStatus, Bill, BillStatus, Consultation, ImportCounts, ImportReport,
    LabTest, LabTestType, Money, Person, Role, RowError, RowErrorKind, StudentProfile,
};

pub use importer::{HealthRecordImporter, ImportError, ImportResult};

pub use config::{CollisionPolicy, ImportOptions, RowCommitMode};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "校医院健康档案系统";
