//! 路由守卫模块 - 领域模型
//!
//! 纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 两类路由：`Guest`（如登录页）和 `Protected`（默认）。
//! 守卫同步读取内存中的认证状态，没有中间加载态。

use std::rc::Rc;

/// 路由访问类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteAccess {
    /// 仅限未登录用户，已登录用户会被送往落地页
    Guest,
    /// 需要认证
    #[default]
    Protected,
}

/// 应用路由需要实现的 trait
pub trait GuardedRoute: Clone + PartialEq {
    /// 将 URL path（已去除 base path）解析为路由
    fn from_path(path: &str) -> Self;

    /// 获取路由对应的 URL path（不含 base path）
    fn to_path(&self) -> String;

    /// **核心守卫属性：该路由的访问类别**
    fn access(&self) -> RouteAccess {
        RouteAccess::Protected
    }

    /// 未认证访问受保护路由时的重定向目标
    fn login() -> Self;

    /// 已认证访问 Guest 路由时的重定向目标
    fn landing() -> Self;
}

/// 守卫判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision<R> {
    Allow,
    Redirect(R),
}

impl<R: Clone> GuardDecision<R> {
    /// 最终应当停留的路由
    pub fn resolve(self, target: &R) -> R {
        match self {
            GuardDecision::Allow => target.clone(),
            GuardDecision::Redirect(r) => r,
        }
    }
}

/// 导航守卫
pub fn guard<R: GuardedRoute>(target: &R, is_authenticated: bool) -> GuardDecision<R> {
    match target.access() {
        RouteAccess::Protected if !is_authenticated => GuardDecision::Redirect(R::login()),
        RouteAccess::Guest if is_authenticated => GuardDecision::Redirect(R::landing()),
        _ => GuardDecision::Allow,
    }
}

/// 导航副作用接口
///
/// 会话存储在登录/注销后通过它跳转，测试中可以替换为记录器。
pub trait Navigator {
    fn navigate(&self, path: &str);
}

impl<T: Navigator + ?Sized> Navigator for Rc<T> {
    fn navigate(&self, path: &str) {
        (**self).navigate(path)
    }
}

/// 记录所有跳转的 Navigator
#[cfg(test)]
#[derive(Default)]
pub struct RecordingNavigator {
    pub visited: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl RecordingNavigator {
    pub fn last(&self) -> Option<String> {
        self.visited.borrow().last().cloned()
    }
}

#[cfg(test)]
impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited.borrow_mut().push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum TestRoute {
        Login,
        Dashboard,
        Settings,
    }

    impl GuardedRoute for TestRoute {
        fn from_path(path: &str) -> Self {
            match path {
                "/login" => Self::Login,
                "/settings" => Self::Settings,
                _ => Self::Dashboard,
            }
        }

        fn to_path(&self) -> String {
            match self {
                Self::Login => "/login",
                Self::Dashboard => "/dashboard",
                Self::Settings => "/settings",
            }
            .to_string()
        }

        fn access(&self) -> RouteAccess {
            match self {
                Self::Login => RouteAccess::Guest,
                _ => RouteAccess::Protected,
            }
        }

        fn login() -> Self {
            Self::Login
        }

        fn landing() -> Self {
            Self::Dashboard
        }
    }

    #[test]
    fn test_unauthenticated_protected_redirects_to_login() {
        let decision = guard(&TestRoute::Settings, false);
        assert_eq!(decision, GuardDecision::Redirect(TestRoute::Login));
        assert_eq!(decision.resolve(&TestRoute::Settings).to_path(), "/login");
    }

    #[test]
    fn test_authenticated_guest_redirects_to_landing() {
        let decision = guard(&TestRoute::Login, true);
        assert_eq!(decision, GuardDecision::Redirect(TestRoute::Dashboard));
        assert_eq!(decision.resolve(&TestRoute::Login).to_path(), "/dashboard");
    }

    #[test]
    fn test_other_combinations_allowed() {
        assert_eq!(guard(&TestRoute::Settings, true), GuardDecision::Allow);
        assert_eq!(guard(&TestRoute::Login, false), GuardDecision::Allow);
    }

    #[test]
    fn test_recording_navigator_through_rc() {
        let nav = Rc::new(RecordingNavigator::default());
        let shared: Rc<dyn Navigator> = nav.clone();
        shared.navigate("/login");
        assert_eq!(nav.last().as_deref(), Some("/login"));
    }
}
