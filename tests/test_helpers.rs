// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库初始化、健康记录 CSV 构造
// ==========================================

#![allow(dead_code)]

use health_center::db::{ensure_schema, open_sqlite_connection};
use rusqlite::Connection;
use std::error::Error;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 导入文件表头（含导入器不使用的冗余列）
pub const HEADER: &[&str] = &[
    "student_id",
    "full_name",
    "college",
    "department",
    "phone",
    "gender",
    "year",
    "appointment_id",
    "appointment_doctor",
    "appointment_date",
    "appointment_time",
    "appointment_reason",
    "appointment_status",
    "consultation_id",
    "symptoms",
    "diagnosis",
    "consultation_doctor",
    "consultation_date",
    "lab_test_id",
    "test_type",
    "test_result",
    "lab_technician",
    "lab_date",
    "bill_id",
    "service",
    "amount",
    "bill_status",
    "bill_date",
];

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时路径不是 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接（导入器、台账、配置共用）
pub fn open_shared(db_path: &str) -> Arc<Mutex<Connection>> {
    let conn = open_sqlite_connection(db_path).expect("打开测试数据库失败");
    Arc::new(Mutex::new(conn))
}

/// 一行健康记录，按列名覆盖默认值
#[derive(Clone)]
pub struct RecordBuilder {
    values: Vec<(&'static str, String)>,
}

impl RecordBuilder {
    pub fn new(student_id: &str) -> Self {
        let defaults: [(&'static str, &str); 28] = [
            ("student_id", student_id),
            ("full_name", "Hana Tesfaye"),
            ("college", "CNCS"),
            ("department", "ICT"),
            ("phone", "0911223344"),
            ("gender", "F"),
            ("year", "2"),
            ("appointment_id", "APT-10000"),
            ("appointment_doctor", "Dr. Lensa"),
            ("appointment_date", "2024-03-14"),
            ("appointment_time", "09:30"),
            ("appointment_reason", "Fever"),
            ("appointment_status", "Completed"),
            ("consultation_id", "CONS-10000"),
            ("symptoms", "Fever and cough"),
            ("diagnosis", "Flu"),
            ("consultation_doctor", "Dr. Roba"),
            ("consultation_date", "2024-03-14"),
            ("lab_test_id", "LAB-10000"),
            ("test_type", "Malaria"),
            ("test_result", "Negative"),
            ("lab_technician", "Merga"),
            ("lab_date", "2024-03-14"),
            ("bill_id", "BILL-10000"),
            ("service", "Malaria Test"),
            ("amount", "35"),
            ("bill_status", "Paid"),
            ("bill_date", "2024-03-14"),
        ];
        Self {
            values: defaults
                .iter()
                .map(|(k, v)| (*k, v.to_string()))
                .collect(),
        }
    }

    pub fn set(mut self, column: &str, value: &str) -> Self {
        if let Some(slot) = self.values.iter_mut().find(|(k, _)| *k == column) {
            slot.1 = value.to_string();
        }
        self
    }

    /// 无问诊：清空问诊相关列
    pub fn without_consultation(self) -> Self {
        self.set("consultation_id", "")
            .set("symptoms", "")
            .set("diagnosis", "")
            .set("consultation_doctor", "")
            .set("consultation_date", "")
    }

    pub fn to_record(&self) -> Vec<String> {
        HEADER
            .iter()
            .map(|column| {
                self.values
                    .iter()
                    .find(|(k, _)| k == column)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default()
            })
            .collect()
    }
}

/// 写入临时 CSV 文件（表头 + 记录）
pub fn write_csv(records: &[RecordBuilder]) -> NamedTempFile {
    write_csv_with_header(HEADER, records.iter().map(|r| r.to_record()))
}

pub fn write_csv_with_header<I>(header: &[&str], records: I) -> NamedTempFile
where
    I: IntoIterator<Item = Vec<String>>,
{
    let file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("创建临时 CSV 失败");
    {
        let mut wtr = csv::Writer::from_path(file.path()).expect("打开临时 CSV 失败");
        wtr.write_record(header).expect("写入表头失败");
        for record in records {
            wtr.write_record(&record).expect("写入记录失败");
        }
        wtr.flush().expect("刷新 CSV 失败");
    }
    file
}

/// 写入原始文本（用于构造畸形 CSV）
pub fn write_raw_csv(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("创建临时 CSV 失败");
    file.write_all(content.as_bytes()).expect("写入临时 CSV 失败");
    file.flush().expect("刷新临时 CSV 失败");
    file
}
