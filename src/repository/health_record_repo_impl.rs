// ==========================================
// 校医院健康档案系统 - 健康档案 Repository 实现
// ==========================================
// 职责: 实现导入相关数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

mod queries;


use crate::db::open_sqlite_connection;
use crate::domain::{
    Appointment, AppointmentStatus, Bill, BillStatus, Consultation, LabTest, LabTestType, Money,
    NewAppointment, NewBill, NewConsultation, NewLabTest, NewPerson, NewStudentProfile, Person,
    Role, StudentProfile,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::health_record_repo::HealthRecordRepository;
use chrono::{Local, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

const ROW_SAVEPOINT: &str = "import_row";

pub(crate) const PERSON_COLUMNS: &str =
    "id, username, first_name, last_name, role, phone_number, date_joined";

pub(crate) const STUDENT_PROFILE_COLUMNS: &str =
    "id, user_id, student_id, college, department, gender, year, date_of_birth, blood_group";

// ==========================================
// 行映射
// ==========================================

fn parse_text_column<T: FromStr<Err = String>>(idx: usize, raw: String) -> rusqlite::Result<T> {
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

pub(crate) fn map_person(row: &Row) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get(0)?,
        username: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        role: parse_text_column::<Role>(4, row.get(4)?)?,
        phone_number: row.get(5)?,
        date_joined: row.get(6)?,
    })
}

pub(crate) fn map_student_profile(row: &Row) -> rusqlite::Result<StudentProfile> {
    Ok(StudentProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        student_id: row.get(2)?,
        college: row.get(3)?,
        department: row.get(4)?,
        gender: row.get(5)?,
        year: row.get(6)?,
        date_of_birth: row.get(7)?,
        blood_group: row.get(8)?,
    })
}

pub(crate) fn map_appointment(row: &Row) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        student_profile_id: row.get(1)?,
        doctor_id: row.get(2)?,
        date: row.get(3)?,
        time: row.get(4)?,
        reason: row.get(5)?,
        status: AppointmentStatus::from_raw(&row.get::<_, String>(6)?),
        created_at: row.get(7)?,
    })
}

pub(crate) fn map_consultation(row: &Row) -> rusqlite::Result<Consultation> {
    Ok(Consultation {
        id: row.get(0)?,
        appointment_id: row.get(1)?,
        student_profile_id: row.get(2)?,
        doctor_id: row.get(3)?,
        symptoms: row.get(4)?,
        diagnosis: row.get(5)?,
        notes: row.get(6)?,
        date: row.get(7)?,
    })
}

pub(crate) fn map_lab_test(row: &Row) -> rusqlite::Result<LabTest> {
    Ok(LabTest {
        id: row.get(0)?,
        student_profile_id: row.get(1)?,
        test_type: parse_text_column::<LabTestType>(2, row.get(2)?)?,
        result: row.get(3)?,
        technician_id: row.get(4)?,
        date: row.get(5)?,
        is_completed: row.get::<_, i64>(6)? != 0,
    })
}

pub(crate) fn map_bill(row: &Row) -> rusqlite::Result<Bill> {
    let cents: i64 = row.get(3)?;
    let amount = Money::from_cents(cents)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Integer, Box::new(e)))?;

    Ok(Bill {
        id: row.get(0)?,
        student_profile_id: row.get(1)?,
        service: row.get(2)?,
        amount,
        date: row.get(4)?,
        status: BillStatus::from_raw(&row.get::<_, String>(5)?),
    })
}

// ==========================================
// HealthRecordRepositoryImpl
// ==========================================
pub struct HealthRecordRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl HealthRecordRepositoryImpl {
    /// 从已有连接创建仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 打开数据库文件并创建仓储
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    /// 共享连接（供批次台账等仓储复用）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn find_person_locked(conn: &Connection, username: &str) -> RepositoryResult<Option<Person>> {
        let sql = format!("SELECT {} FROM person WHERE username = ?1", PERSON_COLUMNS);
        let person = conn
            .query_row(&sql, params![username], map_person)
            .optional()?;
        Ok(person)
    }

    fn find_student_profile_locked(
        conn: &Connection,
        student_id: &str,
    ) -> RepositoryResult<Option<StudentProfile>> {
        let sql = format!(
            "SELECT {} FROM student_profile WHERE student_id = ?1",
            STUDENT_PROFILE_COLUMNS
        );
        let profile = conn
            .query_row(&sql, params![student_id], map_student_profile)
            .optional()?;
        Ok(profile)
    }
}

impl HealthRecordRepository for HealthRecordRepositoryImpl {
    fn get_or_create_person(
        &self,
        username: &str,
        defaults: &NewPerson,
    ) -> RepositoryResult<(Person, bool)> {
        let conn = self.get_conn()?;

        if let Some(existing) = Self::find_person_locked(&conn, username)? {
            return Ok((existing, false));
        }

        let date_joined = Utc::now();
        conn.execute(
            r#"
            INSERT INTO person (username, first_name, last_name, role, date_joined)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                username,
                defaults.first_name,
                defaults.last_name,
                defaults.role.as_str(),
                date_joined,
            ],
        )?;

        let person = Person {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            first_name: defaults.first_name.clone(),
            last_name: defaults.last_name.clone(),
            role: defaults.role,
            phone_number: None,
            date_joined,
        };
        Ok((person, true))
    }

    fn get_or_create_student_profile(
        &self,
        student_id: &str,
        defaults: &NewStudentProfile,
    ) -> RepositoryResult<(StudentProfile, bool)> {
        let conn = self.get_conn()?;

        if let Some(existing) = Self::find_student_profile_locked(&conn, student_id)? {
            return Ok((existing, false));
        }

        conn.execute(
            r#"
            INSERT INTO student_profile (user_id, student_id, college, department, gender, year)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                defaults.user_id,
                student_id,
                defaults.college,
                defaults.department,
                defaults.gender,
                defaults.year,
            ],
        )?;

        let profile = StudentProfile {
            id: conn.last_insert_rowid(),
            user_id: defaults.user_id,
            student_id: student_id.to_string(),
            college: defaults.college.clone(),
            department: defaults.department.clone(),
            gender: defaults.gender.clone(),
            year: defaults.year,
            date_of_birth: None,
            blood_group: None,
        };
        Ok((profile, true))
    }

    fn create_appointment(&self, appointment: &NewAppointment) -> RepositoryResult<Appointment> {
        let conn = self.get_conn()?;
        let created_at = Utc::now();

        conn.execute(
            r#"
            INSERT INTO appointment (
                student_profile_id, doctor_id, date, time, reason, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                appointment.student_profile_id,
                appointment.doctor_id,
                appointment.date,
                appointment.time,
                appointment.reason,
                appointment.status.as_str(),
                created_at,
            ],
        )?;

        Ok(Appointment {
            id: conn.last_insert_rowid(),
            student_profile_id: appointment.student_profile_id,
            doctor_id: appointment.doctor_id,
            date: appointment.date,
            time: appointment.time,
            reason: appointment.reason.clone(),
            status: appointment.status.clone(),
            created_at,
        })
    }

    fn create_consultation(
        &self,
        consultation: &NewConsultation,
    ) -> RepositoryResult<Consultation> {
        let conn = self.get_conn()?;
        let date = Local::now().date_naive();

        conn.execute(
            r#"
            INSERT INTO consultation (
                appointment_id, student_profile_id, doctor_id, symptoms, diagnosis, notes, date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                consultation.appointment_id,
                consultation.student_profile_id,
                consultation.doctor_id,
                consultation.symptoms,
                consultation.diagnosis,
                consultation.notes,
                date,
            ],
        )?;

        Ok(Consultation {
            id: conn.last_insert_rowid(),
            appointment_id: consultation.appointment_id,
            student_profile_id: consultation.student_profile_id,
            doctor_id: consultation.doctor_id,
            symptoms: consultation.symptoms.clone(),
            diagnosis: consultation.diagnosis.clone(),
            notes: consultation.notes.clone(),
            date,
        })
    }

    fn create_lab_test(&self, lab_test: &NewLabTest) -> RepositoryResult<LabTest> {
        let conn = self.get_conn()?;
        let date = Local::now().date_naive();

        conn.execute(
            r#"
            INSERT INTO lab_test (
                student_profile_id, test_type, result, technician_id, date, is_completed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                lab_test.student_profile_id,
                lab_test.test_type.as_str(),
                lab_test.result,
                lab_test.technician_id,
                date,
                lab_test.is_completed as i32,
            ],
        )?;

        Ok(LabTest {
            id: conn.last_insert_rowid(),
            student_profile_id: lab_test.student_profile_id,
            test_type: lab_test.test_type,
            result: lab_test.result.clone(),
            technician_id: lab_test.technician_id,
            date,
            is_completed: lab_test.is_completed,
        })
    }

    fn create_bill(&self, bill: &NewBill) -> RepositoryResult<Bill> {
        let conn = self.get_conn()?;
        let date = Local::now().date_naive();

        conn.execute(
            r#"
            INSERT INTO bill (student_profile_id, service, amount_cents, date, status)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                bill.student_profile_id,
                bill.service,
                bill.amount.cents(),
                date,
                bill.status.as_str(),
            ],
        )?;

        Ok(Bill {
            id: conn.last_insert_rowid(),
            student_profile_id: bill.student_profile_id,
            service: bill.service.clone(),
            amount: bill.amount,
            date,
            status: bill.status.clone(),
        })
    }

    fn begin_row(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(&format!("SAVEPOINT {};", ROW_SAVEPOINT))
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn commit_row(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(&format!("RELEASE SAVEPOINT {};", ROW_SAVEPOINT))
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn rollback_row(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(&format!(
            "ROLLBACK TO SAVEPOINT {sp}; RELEASE SAVEPOINT {sp};",
            sp = ROW_SAVEPOINT
        ))
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }
}
