// ==========================================
// 校医院健康档案系统 - 输入行模型
// ==========================================
// 职责: 列名常量化，必填字段提取失败即 MalformedRow
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;
use std::fmt;

/// 输入文件的必需列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    StudentId,
    FullName,
    College,
    Department,
    Gender,
    Year,
    AppointmentDoctor,
    AppointmentDate,
    AppointmentTime,
    AppointmentReason,
    AppointmentStatus,
    ConsultationId,
    ConsultationDoctor,
    Symptoms,
    Diagnosis,
    LabTechnician,
    TestType,
    TestResult,
    Service,
    Amount,
    BillStatus,
}

impl Field {
    pub const ALL: [Field; 21] = [
        Field::StudentId,
        Field::FullName,
        Field::College,
        Field::Department,
        Field::Gender,
        Field::Year,
        Field::AppointmentDoctor,
        Field::AppointmentDate,
        Field::AppointmentTime,
        Field::AppointmentReason,
        Field::AppointmentStatus,
        Field::ConsultationId,
        Field::ConsultationDoctor,
        Field::Symptoms,
        Field::Diagnosis,
        Field::LabTechnician,
        Field::TestType,
        Field::TestResult,
        Field::Service,
        Field::Amount,
        Field::BillStatus,
    ];

    /// 表头列名
    pub fn column(&self) -> &'static str {
        match self {
            Field::StudentId => "student_id",
            Field::FullName => "full_name",
            Field::College => "college",
            Field::Department => "department",
            Field::Gender => "gender",
            Field::Year => "year",
            Field::AppointmentDoctor => "appointment_doctor",
            Field::AppointmentDate => "appointment_date",
            Field::AppointmentTime => "appointment_time",
            Field::AppointmentReason => "appointment_reason",
            Field::AppointmentStatus => "appointment_status",
            Field::ConsultationId => "consultation_id",
            Field::ConsultationDoctor => "consultation_doctor",
            Field::Symptoms => "symptoms",
            Field::Diagnosis => "diagnosis",
            Field::LabTechnician => "lab_technician",
            Field::TestType => "test_type",
            Field::TestResult => "test_result",
            Field::Service => "service",
            Field::Amount => "amount",
            Field::BillStatus => "bill_status",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ==========================================
// Row - 一条输入记录
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub index: usize, // 1 起始的数据行号
    fields: HashMap<String, String>,
}

impl Row {
    pub fn new(index: usize, fields: HashMap<String, String>) -> Self {
        Self { index, fields }
    }

    /// 由表头与值构造（值少于表头时缺失的列不存在）
    pub fn from_columns<'a, H, V>(index: usize, headers: H, values: V) -> Self
    where
        H: IntoIterator<Item = &'a str>,
        V: IntoIterator<Item = String>,
    {
        let fields = headers
            .into_iter()
            .zip(values)
            .map(|(h, v)| (h.trim().to_string(), v))
            .collect();
        Self { index, fields }
    }

    /// 提取必填列（原值，不裁剪）
    pub fn require(&self, field: Field) -> ImportResult<&str> {
        self.fields
            .get(field.column())
            .map(String::as_str)
            .ok_or_else(|| ImportError::malformed(field.column(), "缺少该列"))
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}
