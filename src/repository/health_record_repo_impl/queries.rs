use super::{
    map_appointment, map_bill, map_consultation, map_lab_test, map_person, map_student_profile,
    HealthRecordRepositoryImpl, PERSON_COLUMNS, STUDENT_PROFILE_COLUMNS,
};
use crate::domain::{Appointment, Bill, Consultation, ImportCounts, LabTest, Person, StudentProfile};
use crate::repository::error::RepositoryResult;
use rusqlite::{params, OptionalExtension};

const APPOINTMENT_COLUMNS: &str =
    "id, student_profile_id, doctor_id, date, time, reason, status, created_at";
const CONSULTATION_COLUMNS: &str =
    "id, appointment_id, student_profile_id, doctor_id, symptoms, diagnosis, notes, date";
const LAB_TEST_COLUMNS: &str =
    "id, student_profile_id, test_type, result, technician_id, date, is_completed";
const BILL_COLUMNS: &str = "id, student_profile_id, service, amount_cents, date, status";

impl HealthRecordRepositoryImpl {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按登录标识查询人员
    pub fn find_person_by_username(&self, username: &str) -> RepositoryResult<Option<Person>> {
        let conn = self.get_conn()?;
        Self::find_person_locked(&conn, username)
    }

    /// 按主键查询人员
    pub fn find_person_by_id(&self, id: i64) -> RepositoryResult<Option<Person>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM person WHERE id = ?1", PERSON_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_person).optional()?)
    }

    /// 按学号查询学生档案
    pub fn find_student_profile(&self, student_id: &str) -> RepositoryResult<Option<StudentProfile>> {
        let conn = self.get_conn()?;
        Self::find_student_profile_locked(&conn, student_id)
    }

    /// 查询学生的全部预约（按主键升序）
    pub fn list_appointments_for_student(
        &self,
        student_profile_id: i64,
    ) -> RepositoryResult<Vec<Appointment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM appointment WHERE student_profile_id = ?1 ORDER BY id",
            APPOINTMENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![student_profile_id], map_appointment)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 查询预约对应的问诊（至多一条）
    pub fn find_consultation_by_appointment(
        &self,
        appointment_id: i64,
    ) -> RepositoryResult<Option<Consultation>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM consultation WHERE appointment_id = ?1",
            CONSULTATION_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![appointment_id], map_consultation)
            .optional()?)
    }

    /// 查询学生的全部检验记录
    pub fn list_lab_tests_for_student(
        &self,
        student_profile_id: i64,
    ) -> RepositoryResult<Vec<LabTest>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM lab_test WHERE student_profile_id = ?1 ORDER BY id",
            LAB_TEST_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![student_profile_id], map_lab_test)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 查询学生的全部账单
    pub fn list_bills_for_student(&self, student_profile_id: i64) -> RepositoryResult<Vec<Bill>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM bill WHERE student_profile_id = ?1 ORDER BY id",
            BILL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![student_profile_id], map_bill)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ==========================================
    // 统计
    // ==========================================

    /// 统计人员数
    pub fn count_people(&self) -> RepositoryResult<usize> {
        self.count_table("person")
    }

    /// 统计五类导入实体的库内总数
    pub fn count_records(&self) -> RepositoryResult<ImportCounts> {
        Ok(ImportCounts {
            students: self.count_table("student_profile")?,
            appointments: self.count_table("appointment")?,
            consultations: self.count_table("consultation")?,
            lab_tests: self.count_table("lab_test")?,
            bills: self.count_table("bill")?,
        })
    }

    fn count_table(&self, table: &'static str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }
}
