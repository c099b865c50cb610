use super::route::TrackerRoute;
use super::use_tracker;
use crate::web::router::use_router;
use leptos::prelude::*;
use midas_shared::UserProfile;

#[component]
pub fn HomePage() -> impl IntoView {
    let ctx = use_tracker();
    let router = use_router::<TrackerRoute>();

    let user = move || ctx.auth.with(|s| s.user.clone());
    let field = move |pick: fn(&UserProfile) -> Option<String>| {
        move || user().as_ref().and_then(pick).unwrap_or_else(|| "-".to_string())
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <Show
                    when=move || user().is_some()
                    fallback=|| view! { <div class="skeleton h-16 w-full"></div> }
                >
                    <h2 class="card-title">
                        {move || user().map(|u| u.name).unwrap_or_default()}
                        <Show when=move || user().is_some_and(|u| u.is_premium)>
                            <span class="badge badge-warning">"Premium"</span>
                        </Show>
                    </h2>
                    <div class="text-sm text-base-content/70 space-y-1">
                        <p>"Phone: " {field(|u| u.phone_number.clone())}</p>
                        <p>"Currency: " {field(|u| u.default_currency.clone())}</p>
                        <p>"Plan: " {field(|u| u.subscription_type.clone())}</p>
                    </div>
                </Show>
            </div>
        </div>

        <div class="card bg-primary text-primary-content shadow-xl">
            <div class="card-body">
                <h3 class="card-title">"Midas Premium"</h3>
                <p>"Voice and photo expense entry, unlimited categories and reports."</p>
                <div class="card-actions justify-end">
                    <button class="btn" on:click=move |_| router.navigate_to_route(TrackerRoute::Subscription, true)>
                        "Manage subscription"
                    </button>
                </div>
            </div>
        </div>
    }
}
