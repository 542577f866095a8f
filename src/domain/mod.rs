// ==========================================
// 校医院健康档案系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、导入结果值对象
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod import;
pub mod money;
pub mod people;
pub mod records;
pub mod types;

// 重导出核心类型
pub use import::{
    CollisionNotice, ImportBatch, ImportCounts, ImportReport, RowError, RowErrorKind,
};
pub use money::{Money, MoneyError};
pub use people::{NewPerson, NewStudentProfile, Person, StudentProfile};
pub use records::{
    Appointment, Bill, Consultation, LabTest, NewAppointment, NewBill, NewConsultation,
    NewLabTest,
};
pub use types::{AppointmentStatus, BillStatus, LabTestType, Role};
