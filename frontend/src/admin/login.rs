use super::use_admin;
use crate::components::TextField;
use crate::error::AuthError;
use crate::form::{FormField, FormHandle, FormRules};
use leptos::prelude::*;
use leptos::task::spawn_local;

fn login_error_text(error: &AuthError) -> String {
    match error {
        AuthError::InvalidCredentials => "Invalid username or password".to_string(),
        AuthError::Network(_) => "Connection failed. Please try again.".to_string(),
        other => other.to_string(),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = use_admin();

    let form = FormHandle::new();
    let rules = FormRules::default();
    let username = StoredValue::new_local(FormField::new(
        &form,
        String::new(),
        vec![rules.required()],
    ));
    let password = StoredValue::new_local(FormField::new(
        &form,
        String::new(),
        vec![rules.required(), rules.min_length(4)],
    ));
    let stored_form = StoredValue::new_local(form.clone());

    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if !stored_form.with_value(|f| f.validate()) {
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let identifier = username.with_value(|f| f.value());
        let secret = password.with_value(|f| f.value());
        let session = ctx.session();
        spawn_local(async move {
            // 成功后会话存储负责跳转
            if let Err(e) = session.login(&identifier, &secret).await {
                set_error_msg.set(Some(login_error_text(&e)));
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Midas Admin"</h1>
                    <p class="text-base-content/70">"Sign in to manage users and subscriptions"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <TextField
                            form=form.clone()
                            field=username
                            label="Username"
                            placeholder="admin"
                            disabled=is_submitting
                        />
                        <TextField
                            form=form.clone()
                            field=password
                            label="Password"
                            input_type="password"
                            placeholder="••••••••"
                            disabled=is_submitting
                        />

                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                                } else {
                                    "Sign in".into_any()
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
