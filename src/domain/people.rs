// ==========================================
// 校医院健康档案系统 - 人员与学生档案
// ==========================================
// 对齐: schema.sql person / student_profile 表
// ==========================================

use crate::domain::types::Role;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Person - 系统用户（学生/医生/检验员等）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub username: String,             // 登录标识（唯一）
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone_number: Option<String>,
    pub date_joined: DateTime<Utc>,
}

impl Person {
    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

/// get-or-create 时使用的默认字段（仅在创建时生效）
#[derive(Debug, Clone, PartialEq)]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

// ==========================================
// StudentProfile - 学生档案
// ==========================================
// 红线: student_id 全局唯一；每个 Person 至多一个档案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: i64,
    pub user_id: i64,
    pub student_id: String,
    pub college: String,
    pub department: String,
    pub gender: String,
    pub year: i32,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_group: Option<String>,
}

/// get-or-create 时使用的默认字段（仅在创建时生效）
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudentProfile {
    pub user_id: i64,
    pub college: String,
    pub department: String,
    pub gender: String,
    pub year: i32,
}
