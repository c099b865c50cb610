use super::use_tracker;
use crate::prefs::{Locale, ThemeMode};
use leptos::prelude::*;

#[component]
pub fn SettingsPage() -> impl IntoView {
    let ctx = use_tracker();

    let theme_buttons = ThemeMode::ALL
        .into_iter()
        .map(|mode| {
            view! {
                <button
                    class=move || if ctx.theme.get() == mode { "btn join-item flex-1 btn-active" } else { "btn join-item flex-1" }
                    on:click=move |_| ctx.set_theme(mode)
                >
                    {if mode.is_dark() { "Dark" } else { "Light" }}
                </button>
            }
        })
        .collect_view();

    let locale_buttons = Locale::ALL
        .into_iter()
        .map(|locale| {
            view! {
                <button
                    class=move || if ctx.locale.get() == locale { "btn join-item flex-1 btn-active" } else { "btn join-item flex-1" }
                    on:click=move |_| ctx.set_locale(locale)
                >
                    {locale.short_name()}
                </button>
            }
        })
        .collect_view();

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body space-y-4">
                <h2 class="card-title">"Settings"</h2>

                <div>
                    <p class="label-text mb-2">"Theme"</p>
                    <div class="join w-full">{theme_buttons}</div>
                </div>

                <div>
                    <p class="label-text mb-2">"Language"</p>
                    <div class="join w-full">{locale_buttons}</div>
                </div>

                <div class="divider"></div>

                <button class="btn btn-outline btn-error" on:click=move |_| ctx.session().logout()>
                    "Log out"
                </button>
            </div>
        </div>
    }
}
