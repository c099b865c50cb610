//! 持久化偏好设置
//!
//! `Persisted<T, S>` 启动时从存储加载，每次修改后立即写回。
//! 主题、语言与倒计时各自使用独立的键，互不依赖。

use crate::web::KeyValueStore;
use midas_shared::date::Timestamp;
use midas_shared::storage_keys;
use std::cell::RefCell;
use std::time::Duration;
use tracing::warn;

/// 可持久化为字符串的值
pub trait PersistedValue: Sized + Clone {
    fn encode(&self) -> String;
    fn decode(raw: &str) -> Option<Self>;
}

/// 加载即读、修改即写的值
pub struct Persisted<T, S> {
    key: &'static str,
    value: RefCell<T>,
    storage: S,
}

impl<T: PersistedValue, S: KeyValueStore> Persisted<T, S> {
    /// 读取存储中的值，缺失或无法解析时使用默认值
    pub fn load(storage: S, key: &'static str, default: T) -> Self {
        let value = storage
            .get(key)
            .and_then(|raw| T::decode(&raw))
            .unwrap_or(default);
        Self {
            key,
            value: RefCell::new(value),
            storage,
        }
    }

    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    pub fn set(&self, value: T) {
        if !self.storage.set(self.key, &value.encode()) {
            warn!(key = self.key, "failed to persist preference");
        }
        *self.value.borrow_mut() = value;
    }
}

// =========================================================
// 主题
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 2] = [ThemeMode::Light, ThemeMode::Dark];

    /// 根据系统偏好选择默认主题
    pub fn preferred(prefers_dark: bool) -> Self {
        if prefers_dark {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, ThemeMode::Dark)
    }
}

impl PersistedValue for ThemeMode {
    fn encode(&self) -> String {
        self.as_str().to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }
}

pub fn theme<S: KeyValueStore>(storage: S, prefers_dark: bool) -> Persisted<ThemeMode, S> {
    Persisted::load(storage, storage_keys::THEME, ThemeMode::preferred(prefers_dark))
}

// =========================================================
// 语言
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    RuRu,
    EnUs,
    UzUz,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::RuRu, Locale::EnUs, Locale::UzUz];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::RuRu => "ru-RU",
            Locale::EnUs => "en-US",
            Locale::UzUz => "uz-UZ",
        }
    }

    /// 语言选择器中的短名称
    pub fn short_name(&self) -> &'static str {
        match self {
            Locale::RuRu => "Рус",
            Locale::EnUs => "Eng",
            Locale::UzUz => "O‘z",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code() == code)
    }
}

impl PersistedValue for Locale {
    fn encode(&self) -> String {
        self.code().to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        Self::from_code(raw)
    }
}

pub fn locale<S: KeyValueStore>(storage: S) -> Persisted<Locale, S> {
    Persisted::load(storage, storage_keys::LOCALE, Locale::default())
}

// =========================================================
// 倒计时
// =========================================================

impl PersistedValue for i64 {
    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

/// 倒计时，存储结束时间戳（毫秒），0 表示未启动
///
/// 刷新页面后倒计时继续。
pub struct Timer<S> {
    end: Persisted<i64, S>,
}

impl<S: KeyValueStore> Timer<S> {
    pub fn load(storage: S) -> Self {
        Self {
            end: Persisted::load(storage, storage_keys::TIMER, 0),
        }
    }

    pub fn start(&self, minutes: u32, now: Timestamp) {
        let end = now + Duration::from_secs(u64::from(minutes) * 60);
        self.end.set(end.as_millis());
    }

    pub fn reset(&self) {
        self.end.set(0);
    }

    pub fn is_active(&self, now: Timestamp) -> bool {
        let end = self.end.get();
        end != 0 && end > now.as_millis()
    }

    pub fn remaining(&self, now: Timestamp) -> Duration {
        if !self.is_active(now) {
            return Duration::ZERO;
        }
        Timestamp::new(self.end.get()) - now
    }

    /// `mm:ss`，未启动或已结束时为 `00:00`
    pub fn display(&self, now: Timestamp) -> String {
        let secs = self.remaining(now).as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// 到期后清零，返回是否仍在计时
    pub fn tick(&self, now: Timestamp) -> bool {
        if self.is_active(now) {
            return true;
        }
        if self.end.get() != 0 {
            self.reset();
        }
        false
    }
}
