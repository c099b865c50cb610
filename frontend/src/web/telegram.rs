//! `window.Telegram.WebApp` 封装
//!
//! 通过 `js_sys::Reflect` 动态读取，宿主脚本未加载时各方法安全地返回空值。

use crate::serde_helper;
use crate::telegram::HostBridge;
use js_sys::{Function, Reflect};
use midas_shared::TelegramUser;
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// 浏览器中的 Telegram WebApp 宿主
#[derive(Debug, Clone, Copy, Default)]
pub struct WebAppBridge;

impl WebAppBridge {
    fn web_app() -> Option<JsValue> {
        let window: JsValue = web_sys::window()?.into();
        let telegram = get(&window, "Telegram")?;
        get(&telegram, "WebApp")
    }
}

impl HostBridge for WebAppBridge {
    fn is_present(&self) -> bool {
        Self::web_app().is_some()
    }

    fn ready(&self) {
        let Some(web_app) = Self::web_app() else {
            return;
        };
        if let Some(ready) = get(&web_app, "ready").and_then(|f| f.dyn_into::<Function>().ok()) {
            if let Err(e) = ready.call0(&web_app) {
                debug!(error = ?e, "WebApp.ready() threw");
            }
        }
    }

    fn init_data(&self) -> Option<String> {
        get(&Self::web_app()?, "initData")?.as_string()
    }

    fn unsafe_user(&self) -> Option<TelegramUser> {
        let unsafe_data = get(&Self::web_app()?, "initDataUnsafe")?;
        let user = get(&unsafe_data, "user")?;
        match serde_helper::from_value(user) {
            Ok(user) => Some(user),
            Err(e) => {
                debug!(error = %e, "initDataUnsafe.user has unexpected shape");
                None
            }
        }
    }
}
