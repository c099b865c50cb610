use super::route::{StatusKind, TrackerRoute};
use crate::web::router::use_router;
use leptos::prelude::*;

#[component]
pub fn StatusPage(kind: StatusKind) -> impl IntoView {
    let router = use_router::<TrackerRoute>();

    let (icon_class, icon) = if kind.is_success() {
        ("text-success", "✓")
    } else {
        ("text-error", "✕")
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content text-center flex-col max-w-md">
                <div class=format!("text-6xl font-bold {}", icon_class)>{icon}</div>
                <h1 class="text-3xl font-bold">{kind.title()}</h1>
                <p class="text-base-content/70">{kind.description()}</p>
                <button
                    class="btn btn-primary"
                    on:click=move |_| router.navigate_to_route(TrackerRoute::Subscription, false)
                >
                    "Back to subscription"
                </button>
            </div>
        </div>
    }
}
