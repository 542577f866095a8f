// ==========================================
// 校医院健康档案系统 - 字段解析与归一化
// ==========================================
// 职责: 纯函数，无存储访问
// 格式: 日期 YYYY-MM-DD，时间 HH:MM（24 小时制）
// ==========================================

use crate::domain::Money;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::row::Field;
use chrono::{NaiveDate, NaiveTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// 日期/时间按原值解析，首尾空白视为格式错误
fn reject_padding(field: Field, raw: &str, what: &str) -> ImportResult<()> {
    if raw.trim() != raw {
        return Err(ImportError::malformed(
            field.column(),
            format!("无效{} '{}': 含首尾空白", what, raw),
        ));
    }
    Ok(())
}

pub fn parse_date(field: Field, raw: &str) -> ImportResult<NaiveDate> {
    reject_padding(field, raw, "日期")?;
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        ImportError::malformed(field.column(), format!("无效日期 '{}': {}", raw, e))
    })
}

pub fn parse_time(field: Field, raw: &str) -> ImportResult<NaiveTime> {
    reject_padding(field, raw, "时间")?;
    NaiveTime::parse_from_str(raw, TIME_FORMAT).map_err(|e| {
        ImportError::malformed(field.column(), format!("无效时间 '{}': {}", raw, e))
    })
}

pub fn parse_year(raw: &str) -> ImportResult<i32> {
    raw.trim().parse::<i32>().map_err(|e| {
        ImportError::malformed(Field::Year.column(), format!("无效年级 '{}': {}", raw, e))
    })
}

pub fn parse_amount(raw: &str) -> ImportResult<Money> {
    Ok(Money::parse_decimal(raw)?)
}

// ==========================================
// 登录标识归一化
// ==========================================

/// 学生: 小写，`-` → `_`
pub fn student_username(student_id: &str) -> String {
    student_id.to_lowercase().replace('-', "_")
}

/// 医生: 小写，空格 → `_`，去掉 `.`
pub fn doctor_username(name: &str) -> String {
    name.to_lowercase().replace(' ', "_").replace('.', "")
}

/// 检验技师: 小写，空格 → `_`（保留 `.`）
pub fn technician_username(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// 姓名拆分: 第一个空格前为名，其余为姓（可为空）
pub fn split_full_name(full_name: &str) -> (String, String) {
    match full_name.split_once(' ') {
        Some((first, last)) => (first.to_string(), last.to_string()),
        None => (full_name.to_string(), String::new()),
    }
}
