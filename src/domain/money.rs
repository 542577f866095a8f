// ==========================================
// 校医院健康档案系统 - 金额（定点数）
// ==========================================
// 存储: 整数分（两位小数）
// 约束: 非负；最多 10 位有效数字（8 位整数 + 2 位小数）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 金额上限（分，不含）
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MoneyError {
    #[error("无法解析为金额: {0}")]
    Invalid(String),

    #[error("金额不能为负数: {0}")]
    Negative(String),

    #[error("金额超出范围: {0}")]
    OutOfRange(String),
}

/// 金额（以分为单位的定点数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Money {
    cents: i64,
}

impl Money {
    pub fn from_cents(cents: i64) -> Result<Self, MoneyError> {
        if cents < 0 {
            return Err(MoneyError::Negative(cents.to_string()));
        }
        if cents >= MAX_AMOUNT_CENTS {
            return Err(MoneyError::OutOfRange(cents.to_string()));
        }
        Ok(Self { cents })
    }

    /// 解析十进制字符串（允许科学计数法，按两位小数四舍五入）
    pub fn parse_decimal(raw: &str) -> Result<Self, MoneyError> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| MoneyError::Invalid(raw.to_string()))?;

        if !value.is_finite() {
            return Err(MoneyError::Invalid(raw.to_string()));
        }
        if value < 0.0 {
            return Err(MoneyError::Negative(raw.to_string()));
        }

        let cents = (value * 100.0).round();
        if cents >= MAX_AMOUNT_CENTS as f64 {
            return Err(MoneyError::OutOfRange(raw.to_string()));
        }

        Ok(Self { cents: cents as i64 })
    }

    pub fn cents(&self) -> i64 {
        self.cents
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}
