//! 订阅页：状态、试用与支付链接

use super::use_tracker;
use crate::components::{Notice, Toast};
use crate::prefs::Timer;
use crate::subscription::{SubscriptionApi, remaining_days};
use crate::web::{BrowserStorage, Interval};
use leptos::prelude::*;
use leptos::task::spawn_local;
use midas_shared::date::now_timestamp;
use midas_shared::{BillingPeriod, PaymentMethod, SubscriptionStatus};
use tracing::warn;

const PLAN_ID: &str = "premium";
/// 支付链接的有效时间（分钟）
const PAYMENT_WINDOW_MINUTES: u32 = 15;

fn period_label(period: BillingPeriod) -> &'static str {
    match period {
        BillingPeriod::Month => "1 month",
        BillingPeriod::Quarter => "3 months",
    }
}

fn method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Payme => "Payme",
        PaymentMethod::Click => "Click",
    }
}

fn open_url(url: &str) {
    if let Some(window) = web_sys::window() {
        if window.location().set_href(url).is_err() {
            warn!(url, "failed to open payment page");
        }
    }
}

#[component]
pub fn SubscriptionPage() -> impl IntoView {
    let ctx = use_tracker();

    let status = RwSignal::new(Option::<SubscriptionStatus>::None);
    let loading = RwSignal::new(true);
    let busy = RwSignal::new(false);
    let notice = RwSignal::new(Notice::None);
    let period = RwSignal::new(BillingPeriod::Month);
    let method = RwSignal::new(PaymentMethod::Payme);
    let payment_url = RwSignal::new(Option::<String>::None);

    // 支付倒计时，刷新页面后继续
    let timer = StoredValue::new_local(Timer::load(BrowserStorage));
    let now = RwSignal::new(now_timestamp());
    let ticker = Interval::new(1000, move || {
        let current = now_timestamp();
        now.set(current);
        timer.with_value(|t| t.tick(current));
    });
    let _ticker = StoredValue::new_local(ticker);
    let countdown = move || timer.with_value(|t| t.display(now.get()));
    let window_open = move || timer.with_value(|t| t.is_active(now.get()));

    let load_status = move || {
        loading.set(true);
        let session = ctx.session();
        spawn_local(async move {
            // 状态读取失败不阻塞页面
            match SubscriptionApi::for_session(&*session).status().await {
                Ok(s) => status.set(Some(s)),
                Err(e) => {
                    warn!(error = %e, "failed to load subscription status");
                    ctx.handle_error(&e);
                }
            }
            loading.set(false);
        });
    };
    load_status();

    let on_trial = move |_| {
        let session = ctx.session();
        let confirm = ctx.confirm();
        spawn_local(async move {
            if !confirm
                .request_success("Start free trial?", "All Premium features for free, no payment needed")
                .await
            {
                return;
            }
            busy.set(true);
            match SubscriptionApi::for_session(&*session).activate_trial().await {
                Ok(activation) => {
                    notice.set(Some((activation.message, false)));
                    load_status();
                    // 资料中的 is_premium 随之更新
                    if let Err(e) = session.load_user(true).await {
                        warn!(error = %e, "failed to reload user after trial");
                    }
                }
                Err(e) => {
                    if let Some(msg) = ctx.handle_error(&e) {
                        notice.set(Some((msg, true)));
                    }
                }
            }
            busy.set(false);
        });
    };

    let on_pay = move |_| {
        let session = ctx.session();
        let confirm = ctx.confirm();
        let chosen_period = period.get_untracked();
        let chosen_method = method.get_untracked();
        spawn_local(async move {
            let subtitle = format!(
                "{} of Premium via {}",
                period_label(chosen_period),
                method_label(chosen_method)
            );
            if !confirm.request_info("Go to payment?", &subtitle).await {
                return;
            }
            busy.set(true);
            match SubscriptionApi::for_session(&*session)
                .payment_link(PLAN_ID, chosen_period, chosen_method)
                .await
            {
                Ok(link) => {
                    let started = now_timestamp();
                    timer.with_value(|t| t.start(PAYMENT_WINDOW_MINUTES, started));
                    now.set(started);
                    payment_url.set(Some(link.url.clone()));
                    open_url(&link.url);
                }
                Err(e) => {
                    if let Some(msg) = ctx.handle_error(&e) {
                        notice.set(Some((msg, true)));
                    }
                }
            }
            busy.set(false);
        });
    };

    let days_left = move || {
        status.with(|s| {
            s.as_ref()
                .and_then(|s| remaining_days(s, now.get()))
        })
    };
    let can_trial = move || status.with(|s| s.as_ref().is_some_and(|s| s.can_start_trial()));
    let is_premium = move || status.with(|s| s.as_ref().is_some_and(|s| s.is_premium));

    view! {
        <Toast notice=notice />

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">"Subscription"</h2>
                <Show
                    when=move || !loading.get()
                    fallback=|| view! { <div class="skeleton h-12 w-full"></div> }
                >
                    <Show
                        when=is_premium
                        fallback=|| view! { <p class="text-base-content/70">"You are on the free plan."</p> }
                    >
                        <p>
                            <span class="badge badge-warning mr-2">
                                {move || status.with(|s| s.as_ref().and_then(|s| s.subscription_type.clone())).unwrap_or_else(|| "premium".to_string())}
                            </span>
                            {move || days_left().map(|d| format!("{} days left", d)).unwrap_or_default()}
                        </p>
                    </Show>
                </Show>
            </div>
        </div>

        <Show when=can_trial>
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Try Premium for free"</h3>
                    <div class="card-actions justify-end">
                        <button class="btn btn-success" disabled=move || busy.get() on:click=on_trial>
                            "Start trial"
                        </button>
                    </div>
                </div>
            </div>
        </Show>

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body space-y-2">
                <h3 class="card-title">"Buy Premium"</h3>
                <div class="join w-full">
                    {[BillingPeriod::Month, BillingPeriod::Quarter].into_iter().map(|p| view! {
                        <button
                            class=move || if period.get() == p { "btn join-item flex-1 btn-active" } else { "btn join-item flex-1" }
                            on:click=move |_| period.set(p)
                        >
                            {period_label(p)}
                        </button>
                    }).collect_view()}
                </div>
                <div class="join w-full">
                    {[PaymentMethod::Payme, PaymentMethod::Click].into_iter().map(|m| view! {
                        <button
                            class=move || if method.get() == m { "btn join-item flex-1 btn-active" } else { "btn join-item flex-1" }
                            on:click=move |_| method.set(m)
                        >
                            {method_label(m)}
                        </button>
                    }).collect_view()}
                </div>
                <Show
                    when=window_open
                    fallback=move || view! {
                        <button class="btn btn-primary w-full" disabled=move || busy.get() on:click=on_pay>
                            "Pay"
                        </button>
                    }
                >
                    <a class="btn btn-outline w-full" href=move || payment_url.get().unwrap_or_default()>
                        "Continue payment " {countdown}
                    </a>
                </Show>
            </div>
        </div>
    }
}
