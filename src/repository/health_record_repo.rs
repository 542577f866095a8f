// ==========================================
// 校医院健康档案系统 - 健康档案 Repository Trait
// ==========================================
// 职责: 定义导入管道所需的存储接口（不包含实现）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::{
    Appointment, Bill, Consultation, LabTest, NewAppointment, NewBill, NewConsultation,
    NewLabTest, NewPerson, NewStudentProfile, Person, StudentProfile,
};
use crate::repository::error::RepositoryResult;

// ==========================================
// HealthRecordRepository Trait
// ==========================================
// 用途: 导入管道的存储边界
// 实现者: HealthRecordRepositoryImpl（使用 rusqlite）
pub trait HealthRecordRepository {
    // ===== get-or-create（按自然键）=====

    /// 按登录标识获取或创建人员
    ///
    /// # 参数
    /// - username: 登录标识（自然键）
    /// - defaults: 仅在创建时使用的字段
    ///
    /// # 返回
    /// - Ok((person, true)): 新建
    /// - Ok((person, false)): 已存在（defaults 被忽略）
    fn get_or_create_person(
        &self,
        username: &str,
        defaults: &NewPerson,
    ) -> RepositoryResult<(Person, bool)>;

    /// 按学号获取或创建学生档案
    ///
    /// # 返回
    /// - Ok((profile, true)): 新建
    /// - Ok((profile, false)): 已存在（defaults 被忽略，不覆盖已有字段）
    fn get_or_create_student_profile(
        &self,
        student_id: &str,
        defaults: &NewStudentProfile,
    ) -> RepositoryResult<(StudentProfile, bool)>;

    // ===== 单条插入 =====

    fn create_appointment(&self, appointment: &NewAppointment) -> RepositoryResult<Appointment>;

    fn create_consultation(
        &self,
        consultation: &NewConsultation,
    ) -> RepositoryResult<Consultation>;

    fn create_lab_test(&self, lab_test: &NewLabTest) -> RepositoryResult<LabTest>;

    fn create_bill(&self, bill: &NewBill) -> RepositoryResult<Bill>;

    // ===== 行级事务边界（SAVEPOINT）=====

    /// 开始单行事务
    fn begin_row(&self) -> RepositoryResult<()>;

    /// 提交单行事务
    fn commit_row(&self) -> RepositoryResult<()>;

    /// 回滚单行事务（本行写入全部撤销）
    fn rollback_row(&self) -> RepositoryResult<()>;
}
