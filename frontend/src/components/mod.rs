//! 两个应用共用的 UI 组件
//!
//! - `ConfirmHost`: 渲染确认队列中的对话框
//! - `TextField`: 绑定 `FormField<String>` 的输入框
//! - `Toast`: 3 秒后自动消失的通知

use crate::confirm::{ConfirmationKind, ConfirmationQueue, ConfirmationRequest};
use crate::form::{FormField, FormHandle};
use leptos::prelude::*;

// =========================================================
// 确认对话框
// =========================================================

/// 在 Context 中共享的确认队列
pub type ConfirmContext = StoredValue<ConfirmationQueue, LocalStorage>;

/// 创建确认队列并提供到 Context
pub fn provide_confirm() -> ConfirmContext {
    let queue: ConfirmContext = StoredValue::new_local(ConfirmationQueue::new());
    provide_context(queue);
    queue
}

fn kind_class(kind: ConfirmationKind) -> &'static str {
    match kind {
        ConfirmationKind::Default => "btn btn-primary",
        ConfirmationKind::Success => "btn btn-success",
        ConfirmationKind::Info => "btn btn-info",
        ConfirmationKind::Error => "btn btn-error",
    }
}

/// 确认对话框宿主
///
/// 订阅队列，按推入顺序渲染所有等待中的请求。
#[component]
pub fn ConfirmHost() -> impl IntoView {
    let queue = use_context::<ConfirmContext>()
        .expect("ConfirmationQueue not found in context. Ensure provide_confirm was called.");

    let active = RwSignal::new(queue.with_value(|q| q.active()));
    let subscription = queue.with_value(|q| q.subscribe(move |list| active.set(list.clone())));
    // 组件销毁时随 Owner 一起 drop，自动退订
    let _subscription = StoredValue::new_local(subscription);

    let answer = move |id: u64, accepted: bool| {
        queue.with_value(|q| q.resolve(id, accepted));
    };

    view! {
        <For
            each=move || active.get()
            key=|req: &ConfirmationRequest| req.id
            children=move |req: ConfirmationRequest| {
                let ConfirmationRequest { id, spec } = req;
                let subtitle = (!spec.subtitle.is_empty()).then(|| {
                    view! { <p class="py-4 text-base-content/70">{spec.subtitle.clone()}</p> }
                });
                view! {
                    <div class="modal modal-open" data-kind=spec.kind.as_str()>
                        <div class="modal-box">
                            <h3 class="font-bold text-lg">{spec.title.clone()}</h3>
                            {subtitle}
                            <div class="modal-action">
                                <button class="btn btn-ghost" on:click=move |_| answer(id, false)>
                                    "Cancel"
                                </button>
                                <button class=kind_class(spec.kind) on:click=move |_| answer(id, true)>
                                    "Confirm"
                                </button>
                            </div>
                        </div>
                        <div class="modal-backdrop" on:click=move |_| queue.with_value(|q| q.cancel(id))></div>
                    </div>
                }
            }
        />
    }
}

// =========================================================
// 输入框
// =========================================================

/// 绑定到表单字段的文本输入框
///
/// 字段本身不是响应式的，这里用信号镜像值与"已请求校验"标志，
/// 二者变化时重新读取 `FormField::error()`。
#[component]
pub fn TextField(
    form: FormHandle,
    field: StoredValue<FormField<String>, LocalStorage>,
    #[prop(into)] label: String,
    #[prop(into, default = "text".to_string())] input_type: String,
    #[prop(into, optional)] placeholder: String,
    #[prop(into, optional)] disabled: Signal<bool>,
) -> impl IntoView {
    let value = RwSignal::new(field.with_value(|f| f.value()));
    let requested = RwSignal::new(form.is_requested());
    let _subscription = StoredValue::new_local(form.subscribe(move |flag| requested.set(*flag)));

    let has_error = move || {
        requested.track();
        value.track();
        field.with_value(|f| f.error().is_some())
    };
    let message = move || {
        requested.track();
        value.track();
        field.with_value(|f| f.error_message())
    };

    view! {
        <div class="form-control">
            <label class="label">
                <span class="label-text">{label}</span>
            </label>
            <input
                type=input_type
                placeholder=placeholder
                class=move || if has_error() { "input input-bordered input-error" } else { "input input-bordered" }
                prop:value=value
                disabled=move || disabled.get()
                on:input=move |ev| {
                    let raw = event_target_value(&ev);
                    field.with_value(|f| f.set_raw_input(&raw));
                    value.set(field.with_value(|f| f.value()));
                }
            />
            <label class="label">
                <span class="label-text-alt text-error">{message}</span>
            </label>
        </div>
    }
}

// =========================================================
// 通知
// =========================================================

/// 通知内容：文字与是否为错误
pub type Notice = Option<(String, bool)>;

/// 右上角通知，3 秒后清除
#[component]
pub fn Toast(notice: RwSignal<Notice>) -> impl IntoView {
    Effect::new(move |_| {
        if notice.get().is_some() {
            set_timeout(
                move || notice.set(None),
                std::time::Duration::from_secs(3),
            );
        }
    });

    view! {
        <Show when=move || notice.with(|n| n.is_some())>
            <div class="toast toast-top toast-end z-50">
                <div class=move || {
                    if notice.with(|n| n.as_ref().is_some_and(|(_, is_err)| *is_err)) {
                        "alert alert-error shadow-lg"
                    } else {
                        "alert alert-success shadow-lg"
                    }
                }>
                    <span>{move || notice.with(|n| n.as_ref().map(|(msg, _)| msg.clone()).unwrap_or_default())}</span>
                </div>
            </div>
        </Show>
    }
}
