//! 持久化存储封装模块
//!
//! `KeyValueStore` 抽象了浏览器 LocalStorage，业务代码只依赖该 trait。
//! - `BrowserStorage`: 浏览器 LocalStorage（`web_sys::Storage`）
//! - `MemoryStorage`: 纯内存实现，用于测试和无浏览器环境

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// 键值存储接口
///
/// 写入失败只返回 `false`，由调用方决定是否记录日志。
pub trait KeyValueStore {
    /// 获取存储的字符串值，键不存在或发生错误时返回 None
    fn get(&self, key: &str) -> Option<String>;
    /// 设置存储值，返回操作是否成功
    fn set(&self, key: &str, value: &str) -> bool;
    /// 删除键值对，返回操作是否成功
    fn delete(&self, key: &str) -> bool;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> bool {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> bool {
        (**self).delete(key)
    }
}

/// 浏览器 LocalStorage
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn delete(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

/// 内存存储
///
/// 克隆后共享同一份数据。
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.borrow_mut().remove(key);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_shares_clones() {
        let a = MemoryStorage::new();
        let b = a.clone();
        assert!(a.set("theme", "dark"));
        assert_eq!(b.get("theme").as_deref(), Some("dark"));
        assert!(b.delete("theme"));
        assert!(a.is_empty());
        // 删除不存在的键同样成功
        assert!(a.delete("theme"));
    }
}
