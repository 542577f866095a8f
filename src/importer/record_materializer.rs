// ==========================================
// 校医院健康档案系统 - 记录落库
// ==========================================
// 顺序: 预约 → 问诊（可选）→ 检验 → 账单
// 约束: 预约日期/时间在任何写入之前解析；
//       之后的失败不撤销本行已写入的实体（ATOMIC 模式由调用方回滚）
// ==========================================

use crate::domain::{
    AppointmentStatus, BillStatus, ImportCounts, LabTestType, NewAppointment, NewBill,
    NewConsultation, NewLabTest,
};
use crate::importer::entity_resolver::EntityResolver;
use crate::importer::error::ImportResult;
use crate::importer::field_parser::{parse_amount, parse_date, parse_time};
use crate::importer::row::{Field, Row};
use crate::repository::HealthRecordRepository;

/// 导入的检验记录一律视为已完成
pub const IMPORTED_LAB_TEST_COMPLETED: bool = true;

/// 一行落库后的实体主键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializedRow {
    pub student_profile_id: i64,
    pub appointment_id: i64,
    pub consultation_id: Option<i64>,
    pub lab_test_id: i64,
    pub bill_id: i64,
}

pub struct RecordMaterializer<'a, R: HealthRecordRepository> {
    repo: &'a R,
}

impl<'a, R: HealthRecordRepository> RecordMaterializer<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// 落库一行
    ///
    /// # 参数
    /// - counts: 本行计数，每写入一个实体立即累加（失败时反映已写入部分）
    pub fn materialize(
        &self,
        row: &Row,
        resolver: &mut EntityResolver<'_, R>,
        counts: &mut ImportCounts,
    ) -> ImportResult<MaterializedRow> {
        let date = parse_date(Field::AppointmentDate, row.require(Field::AppointmentDate)?)?;
        let time = parse_time(Field::AppointmentTime, row.require(Field::AppointmentTime)?)?;

        let student = resolver.resolve_student(row)?;
        if student.resolution.is_created() {
            counts.students += 1;
        }
        let student_profile_id = student.handle.profile_id;

        // ===== 1. 预约 =====
        let doctor = resolver.resolve_doctor(row.require(Field::AppointmentDoctor)?)?;
        let appointment = self.repo.create_appointment(&NewAppointment {
            student_profile_id,
            doctor_id: doctor.handle,
            date,
            time,
            reason: row.require(Field::AppointmentReason)?.to_string(),
            status: AppointmentStatus::from_raw(row.require(Field::AppointmentStatus)?),
        })?;
        counts.appointments += 1;

        // ===== 2. 问诊（consultation_id 非空时）=====
        let consultation_id = if row.require(Field::ConsultationId)?.is_empty() {
            None
        } else {
            let consulting_doctor =
                resolver.resolve_doctor(row.require(Field::ConsultationDoctor)?)?;
            let consultation = self.repo.create_consultation(&NewConsultation {
                appointment_id: appointment.id,
                student_profile_id,
                doctor_id: consulting_doctor.handle,
                symptoms: row.require(Field::Symptoms)?.to_string(),
                diagnosis: row.require(Field::Diagnosis)?.to_string(),
                notes: None,
            })?;
            counts.consultations += 1;
            Some(consultation.id)
        };

        // ===== 3. 检验 =====
        // 空白姓名同样按原值解析（登录标识可为空串）
        let technician = resolver.resolve_technician(row.require(Field::LabTechnician)?)?;
        let test_result = row.require(Field::TestResult)?;
        let lab_test = self.repo.create_lab_test(&NewLabTest {
            student_profile_id,
            test_type: LabTestType::from_import_label(row.require(Field::TestType)?),
            result: (!test_result.is_empty()).then(|| test_result.to_string()),
            technician_id: Some(technician.handle),
            is_completed: IMPORTED_LAB_TEST_COMPLETED,
        })?;
        counts.lab_tests += 1;

        // ===== 4. 账单 =====
        let service = row.require(Field::Service)?.to_string();
        let amount = parse_amount(row.require(Field::Amount)?)?;
        let bill = self.repo.create_bill(&NewBill {
            student_profile_id,
            service,
            amount,
            status: BillStatus::from_raw(row.require(Field::BillStatus)?),
        })?;
        counts.bills += 1;

        Ok(MaterializedRow {
            student_profile_id,
            appointment_id: appointment.id,
            consultation_id,
            lab_test_id: lab_test.id,
            bill_id: bill.id,
        })
    }
}
