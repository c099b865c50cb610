//! 记账应用路由表与布局

use crate::web::{GuardedRoute, RouteAccess};
use tracing::warn;

/// 结果页类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusKind {
    Approved,
    Rejected,
    /// 未知类型同样落到这里
    #[default]
    Close,
}

impl StatusKind {
    pub fn from_param(param: &str) -> Self {
        match param {
            "approved" => StatusKind::Approved,
            "rejected" => StatusKind::Rejected,
            _ => StatusKind::Close,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Approved => "approved",
            StatusKind::Rejected => "rejected",
            StatusKind::Close => "close",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StatusKind::Approved)
    }

    pub fn title(&self) -> &'static str {
        match self {
            StatusKind::Approved => "Payment approved",
            StatusKind::Rejected => "Payment rejected",
            StatusKind::Close => "Payment cancelled",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StatusKind::Approved => "Your premium subscription is now active.",
            StatusKind::Rejected => "The payment did not go through. Please try again.",
            StatusKind::Close => "The payment window was closed before completion.",
        }
    }
}

/// 页面布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// 带底部导航
    #[default]
    Default,
    /// 登录页的居中卡片
    Auth,
    /// 无装饰
    Empty,
}

impl Layout {
    /// 按名称查找布局，未知名称使用 `Default`
    pub fn from_name(name: &str) -> Self {
        match name {
            "Default" => Layout::Default,
            "Auth" => Layout::Auth,
            "Empty" => Layout::Empty,
            other => {
                warn!(layout = other, "unknown layout, using Default");
                Layout::Default
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerRoute {
    Login,
    Home,
    Subscription,
    Settings,
    Status(StatusKind),
}

impl TrackerRoute {
    /// 路由声明的布局名
    pub fn layout_name(&self) -> &'static str {
        match self {
            TrackerRoute::Login => "Auth",
            TrackerRoute::Status(_) => "Empty",
            _ => "Default",
        }
    }

    pub fn layout(&self) -> Layout {
        Layout::from_name(self.layout_name())
    }
}

impl GuardedRoute for TrackerRoute {
    fn from_path(path: &str) -> Self {
        let path = path.trim_end_matches('/');
        if let Some(kind) = path.strip_prefix("/status/") {
            return TrackerRoute::Status(StatusKind::from_param(kind));
        }
        match path {
            "/login" => TrackerRoute::Login,
            "/subscription" => TrackerRoute::Subscription,
            "/settings" => TrackerRoute::Settings,
            "/status" => TrackerRoute::Status(StatusKind::default()),
            // 未知路径回到首页
            _ => TrackerRoute::Home,
        }
    }

    fn to_path(&self) -> String {
        match self {
            TrackerRoute::Login => "/login".to_string(),
            TrackerRoute::Home => "/".to_string(),
            TrackerRoute::Subscription => "/subscription".to_string(),
            TrackerRoute::Settings => "/settings".to_string(),
            TrackerRoute::Status(kind) => format!("/status/{}", kind.as_str()),
        }
    }

    fn access(&self) -> RouteAccess {
        match self {
            TrackerRoute::Login => RouteAccess::Guest,
            _ => RouteAccess::Protected,
        }
    }

    fn login() -> Self {
        TrackerRoute::Login
    }

    fn landing() -> Self {
        TrackerRoute::Home
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::route::{GuardDecision, guard};

    #[test]
    fn test_status_paths() {
        assert_eq!(
            TrackerRoute::from_path("/status/approved"),
            TrackerRoute::Status(StatusKind::Approved)
        );
        assert_eq!(
            TrackerRoute::from_path("/status/unknown"),
            TrackerRoute::Status(StatusKind::Close)
        );
        assert_eq!(TrackerRoute::from_path("/status"), TrackerRoute::Status(StatusKind::Close));
        assert_eq!(
            TrackerRoute::Status(StatusKind::Rejected).to_path(),
            "/status/rejected"
        );
    }

    #[test]
    fn test_unknown_path_is_home() {
        assert_eq!(TrackerRoute::from_path(""), TrackerRoute::Home);
        assert_eq!(TrackerRoute::from_path("/transactions"), TrackerRoute::Home);
        assert_eq!(TrackerRoute::from_path("/settings/"), TrackerRoute::Settings);
    }

    #[test]
    fn test_guard() {
        assert_eq!(
            guard(&TrackerRoute::Subscription, false),
            GuardDecision::Redirect(TrackerRoute::Login)
        );
        assert_eq!(
            guard(&TrackerRoute::Login, true),
            GuardDecision::Redirect(TrackerRoute::Home)
        );
        assert_eq!(
            guard(&TrackerRoute::Status(StatusKind::Approved), true),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_layouts() {
        assert_eq!(TrackerRoute::Login.layout(), Layout::Auth);
        assert_eq!(TrackerRoute::Status(StatusKind::Close).layout(), Layout::Empty);
        assert_eq!(TrackerRoute::Settings.layout(), Layout::Default);
        assert_eq!(Layout::from_name("Sidebar"), Layout::Default);
    }
}
