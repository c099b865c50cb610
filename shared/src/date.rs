//! 时间类型模块
//!
//! - `Timestamp`: 可序列化的毫秒时间戳，用于传输和存储
//! - `now_timestamp()` / `parse_timestamp()`: 获取当前时间与解析后端时间字符串

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use std::time::Duration;

// =========================================================
// Timestamp - 可传输的时间戳类型
// =========================================================

/// 毫秒时间戳
///
/// 内部存储为 `i64`，表示自 Unix 纪元以来的毫秒数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    #[inline]
    pub const fn new(ms: i64) -> Self {
        Self(ms)
    }

    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn as_secs(&self) -> i64 {
        self.0 / 1000
    }

    /// 是否为零值（存储中用 0 表示"未设置"）
    #[inline]
    pub const fn is_unset(&self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.as_millis() as i64)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Duration;

    /// 计算两个时间戳之间的差值，负数截断为 0
    fn sub(self, rhs: Timestamp) -> Self::Output {
        let diff_ms = (self.0 - rhs.0).max(0);
        Duration::from_millis(diff_ms as u64)
    }
}

// =========================================================
// 当前时间与解析
// =========================================================

/// 获取当前时间的毫秒时间戳
#[cfg(target_arch = "wasm32")]
#[inline]
pub fn now_timestamp() -> Timestamp {
    Timestamp(js_sys::Date::now() as i64)
}

/// 获取当前时间的毫秒时间戳
#[cfg(not(target_arch = "wasm32"))]
#[inline]
pub fn now_timestamp() -> Timestamp {
    Timestamp(chrono::Utc::now().timestamp_millis())
}

/// 解析后端返回的时间字符串
///
/// 接受 RFC 3339（带时区），以及不带时区的 ISO 8601（按 UTC 处理）。
/// 返回 None 如果解析失败
pub fn parse_timestamp(s: &str) -> Option<Timestamp> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(Timestamp(dt.timestamp_millis()));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| Timestamp(naive.and_utc().timestamp_millis()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let ts = parse_timestamp("2024-01-01T00:00:00+00:00").unwrap();
        assert_eq!(ts.as_secs(), 1_704_067_200);
    }

    #[test]
    fn test_parse_naive_with_fraction() {
        let ts = parse_timestamp("2024-01-01T00:00:00.250").unwrap();
        assert_eq!(ts.as_millis(), 1_704_067_200_250);
    }

    #[test]
    fn test_parse_space_separated() {
        assert!(parse_timestamp("2024-01-01 10:30:00").is_some());
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_sub_saturates() {
        let a = Timestamp::new(1_000);
        let b = Timestamp::new(5_000);
        assert_eq!(a - b, Duration::ZERO);
        assert_eq!(b - a, Duration::from_secs(4));
    }
}
