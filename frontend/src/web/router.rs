//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 守卫 -> 处理 -> 加载"的导航流程：
//! 初始加载、程序导航、popstate 与认证状态变化都会经过 `route::guard`。

use leptos::prelude::*;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;

use super::route::{GuardDecision, GuardedRoute, Navigator, guard};

// =========================================================
// base path 处理
// =========================================================

/// 从浏览器 pathname 中去除 base path
fn strip_base(base: &str, pathname: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return pathname.to_string();
    }
    match pathname.strip_prefix(base) {
        Some("") => "/".to_string(),
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => pathname.to_string(),
    }
}

/// 为应用内 path 加上 base path
fn join_base(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        path.to_string()
    } else if path == "/" {
        format!("{}/", base)
    } else {
        format!("{}{}", base, path)
    }
}

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态
fn push_history_state(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(url));
        }
    }
}

/// 替换 History 状态（用于重定向）
fn replace_history_state(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(url));
        }
    }
}

// =========================================================
// 路由服务
// =========================================================

/// 路由器服务
///
/// 通过 Signal 驱动界面更新，认证状态以信号形式注入。
pub struct RouterService<R: 'static> {
    current_route: ReadSignal<R>,
    set_route: WriteSignal<R>,
    is_authenticated: Signal<bool>,
    base: &'static str,
}

impl<R: 'static> Clone for RouterService<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: 'static> Copy for RouterService<R> {}

impl<R> RouterService<R>
where
    R: GuardedRoute + Send + Sync + 'static,
{
    /// 创建路由服务，初始路由同样经过守卫
    fn new(base: &'static str, is_authenticated: Signal<bool>) -> Self {
        let requested = R::from_path(&strip_base(base, &current_path()));
        let initial = guard(&requested, is_authenticated.get_untracked()).resolve(&requested);

        if initial != requested {
            debug!(to = %initial.to_path(), "initial route redirected");
            replace_history_state(&join_base(base, &initial.to_path()));
        }

        let (current_route, set_route) = signal(initial);
        Self {
            current_route,
            set_route,
            is_authenticated,
            base,
        }
    }

    /// 当前路由信号
    pub fn current_route(&self) -> ReadSignal<R> {
        self.current_route
    }

    /// 导航到应用内 path
    pub fn navigate(&self, path: &str) {
        self.navigate_to_route(R::from_path(path), true);
    }

    /// 导航到指定路由
    ///
    /// `use_push` 为 false 时使用 replaceState。
    pub fn navigate_to_route(&self, target: R, use_push: bool) {
        let is_auth = self.is_authenticated.get_untracked();

        let resolved = match guard(&target, is_auth) {
            GuardDecision::Allow => target,
            GuardDecision::Redirect(redirect) => {
                info!(
                    from = %target.to_path(),
                    to = %redirect.to_path(),
                    "navigation redirected by guard"
                );
                redirect
            }
        };

        // 同一路由不重复推入历史
        let same = self.current_route.get_untracked() == resolved;
        let url = join_base(self.base, &resolved.to_path());
        if use_push && !same {
            push_history_state(&url);
        } else {
            replace_history_state(&url);
        }
        self.set_route.set(resolved);
    }

    /// 浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;
        let is_authenticated = self.is_authenticated;
        let base = self.base;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target = R::from_path(&strip_base(base, &current_path()));
            match guard(&target, is_authenticated.get_untracked()) {
                GuardDecision::Allow => set_route.set(target),
                GuardDecision::Redirect(redirect) => {
                    debug!(to = %redirect.to_path(), "popstate redirected by guard");
                    replace_history_state(&join_base(base, &redirect.to_path()));
                    set_route.set(redirect);
                }
            }
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 认证状态变化时重新评估当前路由
    fn setup_auth_redirect(&self) {
        let router = *self;

        Effect::new(move |_| {
            let is_auth = router.is_authenticated.get();
            let route = router.current_route.get_untracked();

            if let GuardDecision::Redirect(redirect) = guard(&route, is_auth) {
                info!(
                    authenticated = is_auth,
                    to = %redirect.to_path(),
                    "auth state changed, redirecting"
                );
                push_history_state(&join_base(router.base, &redirect.to_path()));
                router.set_route.set(redirect);
            }
        });
    }
}

impl<R> Navigator for RouterService<R>
where
    R: GuardedRoute + Send + Sync + 'static,
{
    fn navigate(&self, path: &str) {
        RouterService::navigate(self, path);
    }
}

/// 延迟绑定的路由句柄
///
/// 会话存储先于路由服务创建（路由守卫需要会话的初始状态），
/// 路由服务就绪后再通过 `attach` 绑定。
pub struct RouterHandle<R: 'static> {
    slot: Rc<Cell<Option<RouterService<R>>>>,
}

impl<R: 'static> Clone for RouterHandle<R> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<R: 'static> Default for RouterHandle<R> {
    fn default() -> Self {
        Self {
            slot: Rc::new(Cell::new(None)),
        }
    }
}

impl<R: 'static> RouterHandle<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, router: RouterService<R>) {
        self.slot.set(Some(router));
    }
}

impl<R> Navigator for RouterHandle<R>
where
    R: GuardedRoute + Send + Sync + 'static,
{
    fn navigate(&self, path: &str) {
        match self.slot.get() {
            Some(router) => router.navigate(path),
            None => warn!(path, "navigation requested before router was attached"),
        }
    }
}

/// 创建路由服务、注册监听器并提供到 Context
pub fn provide_router<R>(base: &'static str, is_authenticated: Signal<bool>) -> RouterService<R>
where
    R: GuardedRoute + Send + Sync + 'static,
{
    let router = RouterService::<R>::new(base, is_authenticated);
    router.init_popstate_listener();
    router.setup_auth_redirect();
    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router<R>() -> RouterService<R>
where
    R: GuardedRoute + Send + Sync + 'static,
{
    use_context::<RouterService<R>>()
        .expect("RouterService not found in context. Ensure provide_router was called.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet<R>(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(R) -> AnyView,
) -> impl IntoView
where
    R: GuardedRoute + Send + Sync + 'static,
{
    let router = use_router::<R>();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_base() {
        assert_eq!(strip_base("/adminpanel", "/adminpanel/users"), "/users");
        assert_eq!(strip_base("/adminpanel", "/adminpanel"), "/");
        assert_eq!(strip_base("/adminpanel/", "/adminpanel/"), "/");
        // 前缀只匹配完整的路径段
        assert_eq!(strip_base("/admin", "/adminpanel"), "/adminpanel");
        assert_eq!(strip_base("", "/settings"), "/settings");
    }

    #[test]
    fn test_join_base() {
        assert_eq!(join_base("/adminpanel", "/dashboard"), "/adminpanel/dashboard");
        assert_eq!(join_base("/adminpanel", "/"), "/adminpanel/");
        assert_eq!(join_base("", "/login"), "/login");
    }
}
