//! 管理后台应用
//!
//! 挂载在 `/adminpanel` 下，登录后可查看统计数据、管理用户订阅。

mod dashboard;
mod login;
pub mod route;
pub mod service;
mod users;

use crate::api::ApiClient;
use crate::components::{ConfirmContext, ConfirmHost, provide_confirm};
use crate::config::ClientConfig;
use crate::confirm::ConfirmationQueue;
use crate::error::ApiError;
use crate::session::{Session, SessionConfig, SessionStore};
use crate::web::router::{RouterHandle, RouterOutlet, provide_router, use_router};
use crate::web::{BrowserStorage, FetchClient};
use dashboard::DashboardPage;
use leptos::prelude::*;
use login::LoginPage;
use midas_shared::AdminProfile;
use route::AdminRoute;
use service::AdminApi;
use std::rc::Rc;
use tracing::warn;
use users::UsersPage;

pub type AdminSession =
    SessionStore<AdminProfile, FetchClient, BrowserStorage, RouterHandle<AdminRoute>>;

// =========================================================
// Context
// =========================================================

/// 管理后台的共享状态
#[derive(Clone, Copy)]
pub struct AdminContext {
    session: StoredValue<Rc<AdminSession>, LocalStorage>,
    /// 会话快照的信号镜像
    pub auth: RwSignal<Session<AdminProfile>>,
    confirm: ConfirmContext,
}

impl AdminContext {
    pub fn session(&self) -> Rc<AdminSession> {
        self.session.get_value()
    }

    pub fn confirm(&self) -> ConfirmationQueue {
        self.confirm.get_value()
    }

    /// 处理接口错误：未授权时注销，其余返回提示文字
    pub fn handle_error(&self, error: &ApiError) -> Option<String> {
        if error.is_unauthorized() || matches!(error, ApiError::MissingToken) {
            warn!(error = %error, "admin session rejected, logging out");
            self.session().logout();
            return None;
        }
        Some(error.to_string())
    }
}

pub fn use_admin() -> AdminContext {
    use_context::<AdminContext>()
        .expect("AdminContext not found in context. Ensure AdminApp is mounted.")
}

/// 使用当前会话的接口客户端执行异步操作
pub(crate) fn with_admin_api<'a>(session: &'a AdminSession) -> AdminApi<'a, FetchClient> {
    AdminApi::new(session.api(), session.token())
}

// =========================================================
// 应用
// =========================================================

fn route_view(route: AdminRoute) -> AnyView {
    match route {
        AdminRoute::Login => view! { <LoginPage /> }.into_any(),
        AdminRoute::Dashboard => view! { <Shell><DashboardPage /></Shell> }.into_any(),
        AdminRoute::Users => view! { <Shell><UsersPage /></Shell> }.into_any(),
        AdminRoute::NotFound => view! { <Shell><NotFound /></Shell> }.into_any(),
    }
}

#[component]
pub fn AdminApp() -> impl IntoView {
    let config = ClientConfig::admin();

    // 会话先于路由创建，路由就绪后再绑定
    let handle = RouterHandle::<AdminRoute>::new();
    let session = Rc::new(SessionStore::new(
        ApiClient::new(FetchClient, config.api_base),
        BrowserStorage,
        handle.clone(),
        SessionConfig::ADMIN,
    ));

    let auth = RwSignal::new(session.snapshot());
    session.subscribe(move |s| auth.set(s.clone())).forget();
    let is_authenticated = Signal::derive(move || auth.with(|s| s.is_authenticated()));

    let router = provide_router::<AdminRoute>(config.base_path, is_authenticated);
    handle.attach(router);

    let confirm = provide_confirm();
    provide_context(AdminContext {
        session: StoredValue::new_local(session),
        auth,
        confirm,
    });

    view! {
        <RouterOutlet matcher=route_view />
        <ConfirmHost />
    }
}

/// 导航栏 + 内容区
#[component]
fn Shell(children: Children) -> impl IntoView {
    let ctx = use_admin();
    let router = use_router::<AdminRoute>();
    let current = router.current_route();

    let email = move || {
        ctx.auth
            .with(|s| s.user.as_ref().map(|u| u.email.clone()))
            .unwrap_or_default()
    };
    let tab_class = move |route: AdminRoute| {
        move || {
            if current.get() == route {
                "btn btn-ghost btn-active"
            } else {
                "btn btn-ghost"
            }
        }
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-7xl mx-auto space-y-8">
                <div class="navbar bg-base-100 rounded-box shadow-xl">
                    <div class="flex-1 gap-2">
                        <a class="btn btn-ghost text-xl">"Midas Admin"</a>
                        <button class=tab_class(AdminRoute::Dashboard) on:click=move |_| router.navigate("/dashboard")>
                            "Dashboard"
                        </button>
                        <button class=tab_class(AdminRoute::Users) on:click=move |_| router.navigate("/users")>
                            "Users"
                        </button>
                    </div>
                    <div class="flex-none gap-2">
                        <span class="badge badge-neutral hidden md:inline-flex">{email}</span>
                        <button on:click=move |_| ctx.session().logout() class="btn btn-outline btn-error">
                            "Log out"
                        </button>
                    </div>
                </div>
                {children()}
            </div>
        </div>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    let router = use_router::<AdminRoute>();
    view! {
        <div class="hero py-24">
            <div class="hero-content text-center flex-col">
                <h1 class="text-5xl font-bold">"404"</h1>
                <p class="text-base-content/70">"Page not found"</p>
                <button class="btn btn-primary" on:click=move |_| router.navigate("/dashboard")>
                    "Back to dashboard"
                </button>
            </div>
        </div>
    }
}
