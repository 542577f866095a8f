// ==========================================
// 校医院健康档案系统 - 导入层
// ==========================================
// 职责: 平面健康记录文件 → 关系库实体
// 流程: 读取 → 实体解析 → 记录落库 → 批次汇报
// 支持: CSV, Excel
// ==========================================

// 模块声明
pub mod batch_reporter;
pub mod entity_resolver;
pub mod error;
pub mod field_parser;
pub mod file_parser;
pub mod health_record_importer;
pub mod record_materializer;
pub mod row;

// 重导出核心类型
pub use batch_reporter::BatchReporter;
pub use entity_resolver::{EntityResolver, Resolution, Resolved, StudentHandle};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvRowReader, ExcelRowReader, RowSource};
pub use health_record_importer::HealthRecordImporter;
pub use record_materializer::{MaterializedRow, RecordMaterializer};
pub use row::{Field, Row};
