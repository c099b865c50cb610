use super::use_tracker;
use crate::components::TextField;
use crate::error::AuthError;
use crate::form::{FormField, FormHandle, FormRules, InputMask};
use crate::telegram::telegram_user;
use crate::web::WebAppBridge;
use leptos::prelude::*;
use leptos::task::spawn_local;
use midas_shared::PhoneLoginRequest;

/// 乌兹别克斯坦手机号
const PHONE_MASK: &str = "+999 (99) 999-99-99";

/// 由掩码输入构造登录凭据，号码只保留数字
fn phone_credentials(mask: &InputMask, value: &str, telegram_id: Option<i64>) -> PhoneLoginRequest {
    PhoneLoginRequest {
        phone_number: format!("+{}", mask.unmask(value)),
        telegram_id,
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = use_tracker();
    let host_user = telegram_user(&WebAppBridge);
    let greeting = host_user
        .as_ref()
        .map(|u| format!("Hi, {}!", u.first_name))
        .unwrap_or_else(|| "Welcome".to_string());
    let telegram_id = host_user.map(|u| u.id);

    let form = FormHandle::new();
    let rules = FormRules::default();
    let phone = StoredValue::new_local(FormField::with_mask(
        &form,
        String::new(),
        vec![rules.required()],
        InputMask::new(PHONE_MASK),
    ));
    let stored_form = StoredValue::new_local(form.clone());

    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let valid = stored_form.with_value(|f| f.validate());
        if !valid || phone.with_value(|f| f.error().is_some()) {
            return;
        }

        let credentials = phone_credentials(
            &InputMask::new(PHONE_MASK),
            &phone.with_value(|f| f.value()),
            telegram_id,
        );
        set_is_submitting.set(true);
        set_error_msg.set(None);
        phone.with_value(|f| f.set_loading(true));

        let session = ctx.session();
        spawn_local(async move {
            if let Err(e) = session.login_with(&credentials).await {
                let text = match e {
                    AuthError::InvalidCredentials => "This phone number is not registered".to_string(),
                    AuthError::Network(_) => "Connection failed. Please try again.".to_string(),
                    other => other.to_string(),
                };
                set_error_msg.set(Some(text));
            }
            phone.with_value(|f| f.set_loading(false));
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="text-center mb-4">
            <h1 class="text-3xl font-bold">{greeting}</h1>
            <p class="text-base-content/70">"Sign in with your phone number"</p>
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
                    field=phone
                    label="Phone number"
                    input_type="tel"
                    placeholder=PHONE_MASK
                    disabled=is_submitting
                />

                <div class="form-control mt-6">
                    <button class="btn btn-primary" disabled=move || is_submitting.get()>
                        {move || if is_submitting.get() {
                            view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                        } else {
                            "Continue".into_any()
                        }}
                    </button>
                </div>
            </form>
        </div>
    }
}
