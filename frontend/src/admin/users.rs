use super::service::{UserAction, run_confirmed};
use super::{use_admin, with_admin_api};
use crate::components::{Notice, Toast};
use leptos::prelude::*;
use leptos::task::spawn_local;
use midas_shared::protocol::ListUsersRequest;
use midas_shared::{UserPage, UserSummary};

fn action_done_text(action: UserAction) -> &'static str {
    match action {
        UserAction::Grant => "Premium granted",
        UserAction::Revoke => "Premium revoked",
        UserAction::Delete => "User deleted",
    }
}

#[component]
pub fn UsersPage() -> impl IntoView {
    let ctx = use_admin();

    let query = RwSignal::new(ListUsersRequest::default());
    let search_input = RwSignal::new(String::new());
    let page = RwSignal::new(UserPage::default());
    let loading = RwSignal::new(false);
    let notice = RwSignal::new(Notice::None);

    let load_users = move |req: ListUsersRequest| {
        loading.set(true);
        let session = ctx.session();
        spawn_local(async move {
            match with_admin_api(&session).list_users(&req).await {
                Ok(data) => page.set(data),
                Err(e) => {
                    if let Some(msg) = ctx.handle_error(&e) {
                        notice.set(Some((format!("Failed to load users: {}", msg), true)));
                    }
                }
            }
            loading.set(false);
        });
    };

    // 查询条件变化时重新加载
    Effect::new(move |_| load_users(query.get()));

    let on_search = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let search = search_input.get_untracked().trim().to_string();
        query.update(|q| {
            q.search = search;
            q.page = 1;
        });
    };

    let run_action = move |user: UserSummary, action: UserAction| {
        let session = ctx.session();
        let confirm = ctx.confirm();
        spawn_local(async move {
            let admin = with_admin_api(&session);
            match run_confirmed(&confirm, &admin, &user, action).await {
                Ok(true) => {
                    notice.set(Some((action_done_text(action).to_string(), false)));
                    load_users(query.get_untracked());
                }
                Ok(false) => {}
                Err(e) => {
                    if let Some(msg) = ctx.handle_error(&e) {
                        notice.set(Some((msg, true)));
                    }
                }
            }
        });
    };

    let page_count = move || page.with(|p| p.page_count()).max(1);
    let current_page = move || query.with(|q| q.page);
    let go_to = move |delta: i64| {
        let target = (i64::from(current_page()) + delta).clamp(1, i64::from(page_count()));
        query.update(|q| q.page = target as u32);
    };

    view! {
        <Toast notice=notice />

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="flex flex-col md:flex-row md:items-center justify-between gap-4 p-6 pb-2">
                    <div>
                        <h3 class="card-title">"Users"</h3>
                        <p class="text-base-content/70 text-sm">
                            {move || format!("{} users in total", page.with(|p| p.total))}
                        </p>
                    </div>
                    <form class="join" on:submit=on_search>
                        <input
                            type="search"
                            class="input input-bordered join-item"
                            placeholder="Name or phone"
                            prop:value=search_input
                            on:input=move |ev| search_input.set(event_target_value(&ev))
                        />
                        <button class="btn btn-primary join-item">"Search"</button>
                    </form>
                </div>

                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Name"</th>
                                <th class="hidden md:table-cell">"Phone"</th>
                                <th>"Plan"</th>
                                <th class="hidden md:table-cell">"Ends at"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || page.with(|p| p.items.is_empty()) && !loading.get()>
                                <tr>
                                    <td colspan="5" class="text-center py-8 text-base-content/50">
                                        "No users found."
                                    </td>
                                </tr>
                            </Show>
                            <For
                                each=move || page.with(|p| p.items.clone())
                                key=|user: &UserSummary| (user.id.clone(), user.is_premium)
                                children=move |user: UserSummary| {
                                    let premium = user.is_premium;
                                    let toggle = user.clone();
                                    let target = user.clone();
                                    view! {
                                        <tr>
                                            <td>
                                                <div class="font-bold">{user.name.clone()}</div>
                                                <div class="text-xs opacity-50 font-mono">
                                                    {user.telegram_id.map(|id| id.to_string()).unwrap_or_default()}
                                                </div>
                                            </td>
                                            <td class="hidden md:table-cell">{user.phone_number.clone().unwrap_or_default()}</td>
                                            <td>
                                                <span class=if premium { "badge badge-success" } else { "badge badge-ghost" }>
                                                    {user.subscription_type.clone().unwrap_or_else(|| "free".to_string())}
                                                </span>
                                            </td>
                                            <td class="hidden md:table-cell font-mono text-sm">
                                                {user.subscription_ends_at.clone().unwrap_or_default()}
                                            </td>
                                            <td class="text-right space-x-2">
                                                <button
                                                    class="btn btn-xs btn-outline"
                                                    on:click=move |_| {
                                                        let action = if premium { UserAction::Revoke } else { UserAction::Grant };
                                                        run_action(toggle.clone(), action)
                                                    }
                                                >
                                                    {if premium { "Revoke" } else { "Grant" }}
                                                </button>
                                                <button
                                                    class="btn btn-xs btn-error btn-outline"
                                                    on:click=move |_| run_action(target.clone(), UserAction::Delete)
                                                >
                                                    "Delete"
                                                </button>
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>

                <div class="flex items-center justify-center gap-2 p-4">
                    <div class="join">
                        <button class="join-item btn" disabled=move || current_page() <= 1 on:click=move |_| go_to(-1)>
                            "«"
                        </button>
                        <button class="join-item btn btn-disabled">
                            {move || format!("{} / {}", current_page(), page_count())}
                        </button>
                        <button class="join-item btn" disabled=move || current_page() >= page_count() on:click=move |_| go_to(1)>
                            "»"
                        </button>
                    </div>
                </div>
            </div>
        </div>
    }
}
