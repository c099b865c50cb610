use super::{use_admin, with_admin_api};
use crate::components::{Notice, Toast};
use leptos::prelude::*;
use leptos::task::spawn_local;
use midas_shared::DashboardStats;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let ctx = use_admin();

    let stats = RwSignal::new(Option::<DashboardStats>::None);
    let loading = RwSignal::new(true);
    let notice = RwSignal::new(Notice::None);

    let load_stats = move || {
        loading.set(true);
        let session = ctx.session();
        spawn_local(async move {
            match with_admin_api(&session).stats().await {
                Ok(data) => stats.set(Some(data)),
                Err(e) => {
                    if let Some(msg) = ctx.handle_error(&e) {
                        notice.set(Some((format!("Failed to load stats: {}", msg), true)));
                    }
                }
            }
            loading.set(false);
        });
    };

    // 初始加载
    load_stats();

    let stat = move |pick: fn(&DashboardStats) -> u64| {
        move || {
            stats
                .with(|s| s.as_ref().map(pick))
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string())
        }
    };
    let breakdown = move || {
        stats.with(|s| {
            s.as_ref()
                .map(|s| {
                    s.subscription_breakdown
                        .iter()
                        .map(|(plan, count)| (plan.clone(), *count))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
    };

    view! {
        <Toast notice=notice />

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <div class="stat">
                <div class="stat-title">"Total users"</div>
                <div class="stat-value text-primary">{stat(|s| s.total_users)}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Active subscriptions"</div>
                <div class="stat-value text-success">{stat(|s| s.active_subscriptions)}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"New this month"</div>
                <div class="stat-value text-secondary">{stat(|s| s.new_users_this_month)}</div>
            </div>
        </div>

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="flex items-center justify-between">
                    <h3 class="card-title">"Subscriptions by plan"</h3>
                    <button
                        on:click=move |_| load_stats()
                        disabled=move || loading.get()
                        class="btn btn-ghost btn-sm"
                    >
                        {move || if loading.get() {
                            view! { <span class="loading loading-spinner loading-sm"></span> }.into_any()
                        } else {
                            "Refresh".into_any()
                        }}
                    </button>
                </div>
                <table class="table table-zebra w-full">
                    <thead>
                        <tr>
                            <th>"Plan"</th>
                            <th class="text-right">"Users"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=breakdown
                            key=|(plan, _)| plan.clone()
                            children=|(plan, count)| view! {
                                <tr>
                                    <td>{plan}</td>
                                    <td class="text-right font-mono">{count}</td>
                                </tr>
                            }
                        />
                    </tbody>
                </table>
            </div>
        </div>
    }
}
