//! `document.documentElement` 上的主题与语言属性

use crate::prefs::{Locale, ThemeMode};

const DARK_CLASS: &str = "app-dark";

fn root_element() -> Option<web_sys::Element> {
    web_sys::window()?.document()?.document_element()
}

/// 切换根元素上的暗色 class
pub fn apply_theme(mode: ThemeMode) {
    let Some(root) = root_element() else {
        return;
    };
    let classes = root.class_list();
    let _ = if mode.is_dark() {
        classes.add_1(DARK_CLASS)
    } else {
        classes.remove_1(DARK_CLASS)
    };
}

/// 设置根元素的 `lang`
pub fn apply_locale(locale: Locale) {
    if let Some(root) = root_element() {
        let _ = root.set_attribute("lang", locale.code());
    }
}

/// 系统是否偏好暗色
pub fn prefers_dark() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .is_some_and(|mq| mq.matches())
}
