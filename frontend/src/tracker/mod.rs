//! 记账应用
//!
//! 可以在 Telegram Mini-App 中运行（挂载前完成宿主认证），
//! 也可以作为普通网页使用手机号登录。每次导航都会刷新用户资料以同步订阅状态。

mod home;
mod login;
pub mod route;
mod settings;
mod status;
mod subscription_page;

use crate::api::ApiClient;
use crate::components::{ConfirmContext, ConfirmHost, provide_confirm};
use crate::config::ClientConfig;
use crate::confirm::ConfirmationQueue;
use crate::error::ApiError;
use crate::prefs::{self, Locale, Persisted, ThemeMode};
use crate::session::{Session, SessionConfig, SessionStore};
use crate::subscription::refresh_on_navigation;
use crate::telegram;
use crate::web::document;
use crate::web::router::{RouterHandle, RouterOutlet, provide_router, use_router};
use crate::web::{BrowserStorage, FetchClient, WebAppBridge};
use home::HomePage;
use leptos::prelude::*;
use leptos::task::spawn_local;
use login::LoginPage;
use midas_shared::UserProfile;
use route::{Layout, TrackerRoute};
use settings::SettingsPage;
use status::StatusPage;
use std::rc::Rc;
use subscription_page::SubscriptionPage;
use tracing::warn;

pub type TrackerSession =
    SessionStore<UserProfile, FetchClient, BrowserStorage, RouterHandle<TrackerRoute>>;

// =========================================================
// 启动
// =========================================================

/// 浏览器入口：Telegram 握手完成后挂载 `TrackerApp`
///
/// Leptos 执行器在 `mount_to_body` 中才初始化，挂载前的任务交给 wasm-bindgen-futures。
pub fn start() {
    wasm_bindgen_futures::spawn_local(async {
        let api = ApiClient::new(FetchClient, ClientConfig::tracker().api_base);
        telegram::launch(&WebAppBridge, &api, &BrowserStorage, || {
            mount_to_body(TrackerApp)
        })
        .await;
    });
}

// =========================================================
// Context
// =========================================================

struct Preferences {
    theme: Persisted<ThemeMode, BrowserStorage>,
    locale: Persisted<Locale, BrowserStorage>,
}

/// 记账应用的共享状态
#[derive(Clone, Copy)]
pub struct TrackerContext {
    session: StoredValue<Rc<TrackerSession>, LocalStorage>,
    pub auth: RwSignal<Session<UserProfile>>,
    confirm: ConfirmContext,
    prefs: StoredValue<Preferences, LocalStorage>,
    pub theme: RwSignal<ThemeMode>,
    pub locale: RwSignal<Locale>,
}

impl TrackerContext {
    pub fn session(&self) -> Rc<TrackerSession> {
        self.session.get_value()
    }

    pub fn confirm(&self) -> ConfirmationQueue {
        self.confirm.get_value()
    }

    pub fn set_theme(&self, mode: ThemeMode) {
        self.prefs.with_value(|p| p.theme.set(mode));
        document::apply_theme(mode);
        self.theme.set(mode);
    }

    pub fn set_locale(&self, locale: Locale) {
        self.prefs.with_value(|p| p.locale.set(locale));
        document::apply_locale(locale);
        self.locale.set(locale);
    }

    /// 未授权时注销，其余返回提示文字
    pub fn handle_error(&self, error: &ApiError) -> Option<String> {
        if error.is_unauthorized() || matches!(error, ApiError::MissingToken) {
            warn!(error = %error, "tracker session rejected, logging out");
            self.session().logout();
            return None;
        }
        Some(error.to_string())
    }
}

pub fn use_tracker() -> TrackerContext {
    use_context::<TrackerContext>()
        .expect("TrackerContext not found in context. Ensure TrackerApp is mounted.")
}

// =========================================================
// 布局
// =========================================================

fn page_view(route: TrackerRoute) -> AnyView {
    match route {
        TrackerRoute::Login => view! { <LoginPage /> }.into_any(),
        TrackerRoute::Home => view! { <HomePage /> }.into_any(),
        TrackerRoute::Subscription => view! { <SubscriptionPage /> }.into_any(),
        TrackerRoute::Settings => view! { <SettingsPage /> }.into_any(),
        TrackerRoute::Status(kind) => view! { <StatusPage kind=kind /> }.into_any(),
    }
}

fn route_view(route: TrackerRoute) -> AnyView {
    let page = page_view(route);
    match route.layout() {
        Layout::Default => view! {
            <div class="min-h-screen bg-base-200 pb-20">
                <main class="max-w-xl mx-auto p-4 space-y-4">{page}</main>
                <BottomNav />
            </div>
        }
        .into_any(),
        Layout::Auth => view! {
            <div class="hero min-h-screen bg-base-200">
                <div class="hero-content flex-col w-full max-w-md">{page}</div>
            </div>
        }
        .into_any(),
        Layout::Empty => page,
    }
}

#[component]
fn BottomNav() -> impl IntoView {
    let router = use_router::<TrackerRoute>();
    let current = router.current_route();

    let item = move |route: TrackerRoute, label: &'static str| {
        view! {
            <button
                class=move || if current.get() == route { "active text-primary" } else { "" }
                on:click=move |_| router.navigate_to_route(route, true)
            >
                <span class="btm-nav-label">{label}</span>
            </button>
        }
    };

    view! {
        <div class="btm-nav">
            {item(TrackerRoute::Home, "Home")}
            {item(TrackerRoute::Subscription, "Premium")}
            {item(TrackerRoute::Settings, "Settings")}
        </div>
    }
}

// =========================================================
// 应用
// =========================================================

#[component]
pub fn TrackerApp() -> impl IntoView {
    let config = ClientConfig::tracker();

    let theme_pref = prefs::theme(BrowserStorage, document::prefers_dark());
    let locale_pref = prefs::locale(BrowserStorage);
    let theme = RwSignal::new(theme_pref.get());
    let locale = RwSignal::new(locale_pref.get());
    document::apply_theme(theme_pref.get());
    document::apply_locale(locale_pref.get());

    // 会话先于路由创建，路由就绪后再绑定
    let handle = RouterHandle::<TrackerRoute>::new();
    let session = Rc::new(SessionStore::new(
        ApiClient::new(FetchClient, config.api_base),
        BrowserStorage,
        handle.clone(),
        SessionConfig::TRACKER,
    ));

    let auth = RwSignal::new(session.snapshot());
    session.subscribe(move |s| auth.set(s.clone())).forget();
    let is_authenticated = Signal::derive(move || auth.with(|s| s.is_authenticated()));

    let router = provide_router::<TrackerRoute>(config.base_path, is_authenticated);
    handle.attach(router);

    let confirm = provide_confirm();
    let ctx = TrackerContext {
        session: StoredValue::new_local(session),
        auth,
        confirm,
        prefs: StoredValue::new_local(Preferences {
            theme: theme_pref,
            locale: locale_pref,
        }),
        theme,
        locale,
    };
    provide_context(ctx);

    // 每次导航后刷新资料，失败不影响页面
    let current = router.current_route();
    Effect::new(move |_| {
        current.track();
        let session = ctx.session();
        spawn_local(async move {
            refresh_on_navigation(&*session).await;
        });
    });

    view! {
        <RouterOutlet matcher=route_view />
        <ConfirmHost />
    }
}
