// ==========================================
// 校医院健康档案系统 - 领域类型定义
// ==========================================
// 说明: 角色/状态/检验类型等枚举
// 序列化格式: 与数据库存储值一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 人员角色 (Role)
// ==========================================
// 红线: 导入创建的人员角色在创建时确定,之后不再修改
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Doctor,
    Nurse,
    LabTech,
    Pharmacist,
    Receptionist,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::LabTech => "lab_tech",
            Role::Pharmacist => "pharmacist",
            Role::Receptionist => "receptionist",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "nurse" => Ok(Role::Nurse),
            "lab_tech" => Ok(Role::LabTech),
            "pharmacist" => Ok(Role::Pharmacist),
            "receptionist" => Ok(Role::Receptionist),
            "student" => Ok(Role::Student),
            other => Err(format!("未知角色: {}", other)),
        }
    }
}

// ==========================================
// 预约状态 (Appointment Status)
// ==========================================
// 导入时原样落库,不做校验；无法识别的值保存在 Unrecognized 中
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Completed,
    Cancelled,
    Unrecognized(String),
}

impl AppointmentStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "Pending" => AppointmentStatus::Pending,
            "Approved" => AppointmentStatus::Approved,
            "Completed" => AppointmentStatus::Completed,
            "Cancelled" => AppointmentStatus::Cancelled,
            other => AppointmentStatus::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Approved => "Approved",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Unrecognized(raw) => raw,
        }
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Pending
    }
}

impl From<String> for AppointmentStatus {
    fn from(raw: String) -> Self {
        AppointmentStatus::from_raw(&raw)
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 账单状态 (Bill Status)
// ==========================================
// 同预约状态: 导入不校验,原值保留
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillStatus {
    Pending,
    Paid,
    Unrecognized(String),
}

impl BillStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "Pending" => BillStatus::Pending,
            "Paid" => BillStatus::Paid,
            other => BillStatus::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BillStatus::Pending => "Pending",
            BillStatus::Paid => "Paid",
            BillStatus::Unrecognized(raw) => raw,
        }
    }
}

impl Default for BillStatus {
    fn default() -> Self {
        BillStatus::Pending
    }
}

impl From<String> for BillStatus {
    fn from(raw: String) -> Self {
        BillStatus::from_raw(&raw)
    }
}

impl From<BillStatus> for String {
    fn from(status: BillStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 检验类型 (Lab Test Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabTestType {
    Malaria,
    Urine,
    Blood,
    #[serde(rename = "TB")]
    Tb,
    #[serde(rename = "CBC")]
    Cbc,
    Other,
}

impl LabTestType {
    /// 导入文件中的检验名称 → 检验类型
    ///
    /// 全函数: 未列出的名称一律归入 Other
    pub fn from_import_label(label: &str) -> Self {
        match label {
            "Malaria" => LabTestType::Malaria,
            "Urine Test" => LabTestType::Urine,
            "Blood Test" => LabTestType::Blood,
            "TB Test" => LabTestType::Tb,
            "CBC" => LabTestType::Cbc,
            _ => LabTestType::Other,
        }
    }

    /// 数据库存储值
    pub fn as_str(&self) -> &'static str {
        match self {
            LabTestType::Malaria => "Malaria",
            LabTestType::Urine => "Urine",
            LabTestType::Blood => "Blood",
            LabTestType::Tb => "TB",
            LabTestType::Cbc => "CBC",
            LabTestType::Other => "Other",
        }
    }
}

impl fmt::Display for LabTestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabTestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Malaria" => Ok(LabTestType::Malaria),
            "Urine" => Ok(LabTestType::Urine),
            "Blood" => Ok(LabTestType::Blood),
            "TB" => Ok(LabTestType::Tb),
            "CBC" => Ok(LabTestType::Cbc),
            "Other" => Ok(LabTestType::Other),
            other => Err(format!("未知检验类型: {}", other)),
        }
    }
}
