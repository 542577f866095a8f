// ==========================================
// 校医院健康档案系统 - 就诊相关记录
// ==========================================
// 对齐: schema.sql appointment / consultation / lab_test / bill 表
// 归属: 均通过 student_profile_id 归属于学生档案（级联删除）
// ==========================================

use crate::domain::money::Money;
use crate::domain::types::{AppointmentStatus, BillStatus, LabTestType};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Appointment - 预约
// ==========================================
// 状态只通过显式更新变化,不做推断
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub student_profile_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub student_profile_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: String,
    pub status: AppointmentStatus,
}

// ==========================================
// Consultation - 问诊（每个预约至多一条）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: i64,
    pub appointment_id: i64,
    pub student_profile_id: i64,
    pub doctor_id: i64,
    pub symptoms: String,
    pub diagnosis: String,
    pub notes: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewConsultation {
    pub appointment_id: i64,
    pub student_profile_id: i64,
    pub doctor_id: i64,
    pub symptoms: String,
    pub diagnosis: String,
    pub notes: Option<String>,
}

// ==========================================
// LabTest - 检验
// ==========================================
// technician_id 可空: 检验员被删除后置空,检验记录保留
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTest {
    pub id: i64,
    pub student_profile_id: i64,
    pub test_type: LabTestType,
    pub result: Option<String>,
    pub technician_id: Option<i64>,
    pub date: NaiveDate,
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLabTest {
    pub student_profile_id: i64,
    pub test_type: LabTestType,
    pub result: Option<String>,
    pub technician_id: Option<i64>,
    pub is_completed: bool,
}

// ==========================================
// Bill - 账单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: i64,
    pub student_profile_id: i64,
    pub service: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub status: BillStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBill {
    pub student_profile_id: i64,
    pub service: String,
    pub amount: Money,
    pub status: BillStatus,
}
