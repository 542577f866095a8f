// ==========================================
// 校医院健康档案系统 - 实体解析器
// ==========================================
// 职责: 自然键 → 已落库实体（学生/医生/检验技师）
// 缓存: 三个独立映射，生命周期 = 一次导入
// 冲突: 不同原始名称归一化到同一登录标识时显式报告
// ==========================================

use crate::config::CollisionPolicy;
use crate::domain::{CollisionNotice, NewPerson, NewStudentProfile, Person, Role};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_parser::{
    doctor_username, parse_year, split_full_name, student_username, technician_username,
};
use crate::importer::row::{Field, Row};
use crate::repository::HealthRecordRepository;
use std::collections::HashMap;
use tracing::{debug, warn};

// ==========================================
// Resolution - 解析结果来源
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// 本次导入的缓存命中
    Cached,
    /// 库中已存在且属性一致
    Found,
    /// 新建
    Created,
    /// 库中已存在但名称或角色不同（宽松模式下仍绑定）
    Collided {
        existing_name: String,
        existing_role: Role,
    },
}

impl Resolution {
    pub fn is_created(&self) -> bool {
        matches!(self, Resolution::Created)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub handle: T,
    pub resolution: Resolution,
}

/// 学生句柄（档案 + 账号）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudentHandle {
    pub profile_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheKind {
    Student,
    Doctor,
    Technician,
}

// ==========================================
// EntityResolver
// ==========================================
pub struct EntityResolver<'a, R: HealthRecordRepository> {
    repo: &'a R,
    policy: CollisionPolicy,
    students: HashMap<String, StudentHandle>,
    doctors: HashMap<String, i64>,
    technicians: HashMap<String, i64>,
    // 当前行新增的缓存项，行回滚时撤销
    row_journal: Vec<(CacheKind, String)>,
    row_collisions: Vec<CollisionNotice>,
    row_index: usize,
}

impl<'a, R: HealthRecordRepository> EntityResolver<'a, R> {
    pub fn new(repo: &'a R, policy: CollisionPolicy) -> Self {
        Self {
            repo,
            policy,
            students: HashMap::new(),
            doctors: HashMap::new(),
            technicians: HashMap::new(),
            row_journal: Vec::new(),
            row_collisions: Vec::new(),
            row_index: 0,
        }
    }

    // ==========================================
    // 行边界
    // ==========================================

    pub fn begin_row(&mut self, row_index: usize) {
        self.row_index = row_index;
        self.row_journal.clear();
        self.row_collisions.clear();
    }

    /// 保留本行缓存项，返回本行发现的冲突
    pub fn commit_row(&mut self) -> Vec<CollisionNotice> {
        self.row_journal.clear();
        std::mem::take(&mut self.row_collisions)
    }

    /// 撤销本行新增的缓存项（对应的实体已被回滚）
    pub fn rollback_row(&mut self) {
        for (kind, key) in self.row_journal.drain(..) {
            match kind {
                CacheKind::Student => {
                    self.students.remove(&key);
                }
                CacheKind::Doctor => {
                    self.doctors.remove(&key);
                }
                CacheKind::Technician => {
                    self.technicians.remove(&key);
                }
            }
        }
        self.row_collisions.clear();
    }

    // ==========================================
    // 解析
    // ==========================================

    /// 解析学生（按 student_id 原值）
    ///
    /// 首次出现时创建账号与档案；档案已存在时不覆盖任何字段。
    pub fn resolve_student(&mut self, row: &Row) -> ImportResult<Resolved<StudentHandle>> {
        let student_id = row.require(Field::StudentId)?;
        if let Some(handle) = self.students.get(student_id) {
            return Ok(Resolved {
                handle: *handle,
                resolution: Resolution::Cached,
            });
        }

        let full_name = row.require(Field::FullName)?;
        let (first_name, last_name) = split_full_name(full_name);
        let username = student_username(student_id);
        let defaults = NewPerson {
            first_name,
            last_name,
            role: Role::Student,
        };
        let (user, _) = self.get_or_create_person(full_name, &username, &defaults)?;

        let profile_defaults = NewStudentProfile {
            user_id: user.id,
            college: row.require(Field::College)?.to_string(),
            department: row.require(Field::Department)?.to_string(),
            gender: row.require(Field::Gender)?.to_string(),
            year: parse_year(row.require(Field::Year)?)?,
        };
        let (profile, created) = self
            .repo
            .get_or_create_student_profile(student_id, &profile_defaults)?;

        let handle = StudentHandle {
            profile_id: profile.id,
            user_id: profile.user_id,
        };
        self.students.insert(student_id.to_string(), handle);
        self.row_journal
            .push((CacheKind::Student, student_id.to_string()));

        let resolution = if created {
            debug!(row = self.row_index, student_id, "新建学生档案");
            Resolution::Created
        } else {
            Resolution::Found
        };
        Ok(Resolved { handle, resolution })
    }

    /// 解析医生（预约医生与问诊医生共用缓存）
    pub fn resolve_doctor(&mut self, name: &str) -> ImportResult<Resolved<i64>> {
        self.resolve_staff(CacheKind::Doctor, name, doctor_username(name), Role::Doctor)
    }

    /// 解析检验技师
    pub fn resolve_technician(&mut self, name: &str) -> ImportResult<Resolved<i64>> {
        self.resolve_staff(
            CacheKind::Technician,
            name,
            technician_username(name),
            Role::LabTech,
        )
    }

    fn resolve_staff(
        &mut self,
        kind: CacheKind,
        name: &str,
        username: String,
        role: Role,
    ) -> ImportResult<Resolved<i64>> {
        let cache = match kind {
            CacheKind::Doctor => &self.doctors,
            _ => &self.technicians,
        };
        if let Some(id) = cache.get(name) {
            return Ok(Resolved {
                handle: *id,
                resolution: Resolution::Cached,
            });
        }

        // 医生/技师姓名整体存入 first_name
        let defaults = NewPerson {
            first_name: name.to_string(),
            last_name: String::new(),
            role,
        };
        let (person, resolution) = self.get_or_create_person(name, &username, &defaults)?;

        let cache = match kind {
            CacheKind::Doctor => &mut self.doctors,
            _ => &mut self.technicians,
        };
        cache.insert(name.to_string(), person.id);
        self.row_journal.push((kind, name.to_string()));

        Ok(Resolved {
            handle: person.id,
            resolution,
        })
    }

    fn get_or_create_person(
        &mut self,
        raw_name: &str,
        username: &str,
        defaults: &NewPerson,
    ) -> ImportResult<(Person, Resolution)> {
        let (person, created) = self.repo.get_or_create_person(username, defaults)?;
        if created {
            return Ok((person, Resolution::Created));
        }

        let same_identity = person.role == defaults.role
            && person.first_name == defaults.first_name
            && (defaults.role != Role::Student || person.last_name == defaults.last_name);
        if same_identity {
            return Ok((person, Resolution::Found));
        }

        let existing_name = person.full_name();
        if self.policy == CollisionPolicy::Strict {
            return Err(ImportError::ResolutionCollision {
                raw_name: raw_name.to_string(),
                username: username.to_string(),
                existing_name,
                existing_role: person.role.as_str().to_string(),
            });
        }

        warn!(
            row = self.row_index,
            raw_name,
            username,
            existing_name = %existing_name,
            existing_role = person.role.as_str(),
            "登录标识冲突，绑定到已有用户"
        );
        self.row_collisions.push(CollisionNotice {
            row_index: self.row_index,
            raw_name: raw_name.to_string(),
            username: username.to_string(),
            existing_name: existing_name.clone(),
            existing_role: person.role.as_str().to_string(),
        });

        let resolution = Resolution::Collided {
            existing_name,
            existing_role: person.role,
        };
        Ok((person, resolution))
    }

    // ==========================================
    // 缓存规模
    // ==========================================

    pub fn cached_students(&self) -> usize {
        self.students.len()
    }

    pub fn cached_doctors(&self) -> usize {
        self.doctors.len()
    }

    pub fn cached_technicians(&self) -> usize {
        self.technicians.len()
    }
}
