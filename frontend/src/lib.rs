//! Midas 前端
//!
//! 两个 CSR 应用共用一套客户端核心：
//! - `session`: 会话存储（Token + 资料，持久化，登录/注销/恢复）
//! - `web::route` / `web::router`: 路由守卫与 History 路由服务
//! - `confirm`: 基于 future 的确认对话框编排
//! - `form`: 字段校验与表单聚合
//! - `telegram`: Telegram Mini-App 认证握手
//! - `admin` / `tracker`: 管理后台与记账应用的 UI 层
//!
//! 核心逻辑只依赖 `web` 中的适配器 trait，测试使用内存实现。

pub mod api;
pub mod config;
pub mod confirm;
pub mod error;
pub mod form;
pub mod observer;
pub mod prefs;
mod serde_helper;
pub mod session;
pub mod subscription;
pub mod telegram;

pub mod admin;
pub mod components;
pub mod tracker;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，业务代码通过 trait 使用。
pub mod web {
    pub mod document;
    mod http;
    pub mod route;
    pub mod router;
    mod storage;
    mod telegram;
    mod timer;

    #[cfg(test)]
    pub use http::MockHttpClient;
    pub use http::{FetchClient, HttpClient, HttpRequest, HttpResponse};
    #[cfg(test)]
    pub use route::RecordingNavigator;
    pub use route::{GuardDecision, GuardedRoute, Navigator, RouteAccess};
    pub use storage::{BrowserStorage, KeyValueStore, MemoryStorage};
    pub use telegram::WebAppBridge;
    pub use timer::Interval;
}

pub use admin::AdminApp;
pub use tracker::TrackerApp;
