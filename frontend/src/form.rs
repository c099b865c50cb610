//! 表单校验模块
//!
//! - `FormHandle`: 表单聚合器，持有共享的"已请求校验"标志和各字段的有效性探针
//! - `FormField`: 字段值 + 有序规则 + 可选输入掩码，按需重新计算当前错误
//!
//! 在表单请求校验之前，字段不显示任何规则错误，用户可以自由输入。

pub mod mask;
pub mod rules;

pub use mask::InputMask;
pub use rules::{FormRules, RuleMessage};

use crate::observer::{Observers, Subscription};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

// =========================================================
// 规则与错误
// =========================================================

/// 校验规则：通过返回 `Ok(())`，失败返回错误信息
pub struct Rule<V>(Rc<dyn Fn(&V) -> Result<(), String>>);

impl<V> Rule<V> {
    pub fn new(check: impl Fn(&V) -> Result<(), String> + 'static) -> Self {
        Self(Rc::new(check))
    }

    pub fn check(&self, value: &V) -> Result<(), String> {
        (self.0)(value)
    }
}

impl<V> Clone for Rule<V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// 字段错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// 第一条未通过的规则给出的信息
    Rule(String),
    /// 输入未填满掩码（只高亮，不显示文字）
    MaskMismatch,
}

impl FieldError {
    /// 展示用文字
    pub fn message(&self) -> &str {
        match self {
            FieldError::Rule(msg) => msg,
            FieldError::MaskMismatch => "",
        }
    }
}

/// 字段值类型
pub trait FieldValue: Clone + 'static {
    /// 是否为空值（`required` 据此判断）
    fn is_blank(&self) -> bool;

    /// 数值视图，供 `min_value` 使用
    fn as_number(&self) -> Option<f64> {
        None
    }
}

impl FieldValue for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }

    fn as_number(&self) -> Option<f64> {
        self.trim().parse().ok()
    }
}

macro_rules! numeric_field_value {
    ($($t:ty),*) => {
        $(
            impl FieldValue for $t {
                // 0 视为空值
                fn is_blank(&self) -> bool {
                    *self == (0 as $t)
                }

                fn as_number(&self) -> Option<f64> {
                    Some(*self as f64)
                }
            }
        )*
    };
}

numeric_field_value!(i32, i64, u32, u64, f64);

impl<T: FieldValue> FieldValue for Option<T> {
    fn is_blank(&self) -> bool {
        self.as_ref().is_none_or(|v| v.is_blank())
    }

    fn as_number(&self) -> Option<f64> {
        self.as_ref().and_then(|v| v.as_number())
    }
}

// =========================================================
// 表单聚合器
// =========================================================

type Probe = Rc<dyn Fn(bool) -> bool>;

struct FormInner {
    requested: Cell<bool>,
    next_id: Cell<u64>,
    probes: RefCell<BTreeMap<u64, Probe>>,
    observers: Observers<bool>,
}

/// 表单聚合器
///
/// 显式传给每个字段的构造函数；克隆后指向同一个表单。
#[derive(Clone)]
pub struct FormHandle {
    inner: Rc<FormInner>,
}

impl FormHandle {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(FormInner {
                requested: Cell::new(false),
                next_id: Cell::new(0),
                probes: RefCell::new(BTreeMap::new()),
                observers: Observers::new(),
            }),
        }
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.get()
    }

    /// 请求校验（提交表单时调用），所有字段开始显示错误
    pub fn request_validation(&self) {
        self.set_requested(true);
    }

    /// 回到未校验状态
    pub fn reset(&self) {
        self.set_requested(false);
    }

    fn set_requested(&self, value: bool) {
        if self.inner.requested.replace(value) != value {
            self.inner.observers.notify(&value);
        }
    }

    /// 请求校验并返回整体有效性
    pub fn validate(&self) -> bool {
        self.request_validation();
        self.is_valid()
    }

    /// 所有已注册字段是否有效
    pub fn is_valid(&self) -> bool {
        let requested = self.is_requested();
        let probes: Vec<Probe> = self.inner.probes.borrow().values().cloned().collect();
        probes.iter().all(|probe| probe(requested))
    }

    /// 注册有效性探针，返回的句柄被 drop 时注销
    ///
    /// 探针参数为当前的"已请求校验"标志。
    pub fn register(&self, probe: impl Fn(bool) -> bool + 'static) -> Registration {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.probes.borrow_mut().insert(id, Rc::new(probe));

        Registration {
            form: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn registered(&self) -> usize {
        self.inner.probes.borrow().len()
    }

    /// 订阅"已请求校验"标志的变化
    pub fn subscribe(&self, listener: impl Fn(&bool) + 'static) -> Subscription {
        self.inner.observers.subscribe(listener)
    }
}

impl Default for FormHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// 字段在表单中的注册句柄
pub struct Registration {
    form: Weak<FormInner>,
    id: u64,
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(form) = self.form.upgrade() {
            form.probes.borrow_mut().remove(&self.id);
        }
    }
}

// =========================================================
// 字段
// =========================================================

struct FieldState<V> {
    value: RefCell<V>,
    rules: Vec<Rule<V>>,
    mask: Option<InputMask>,
    mask_complete: Cell<bool>,
    loading: Cell<bool>,
}

impl<V: FieldValue> FieldState<V> {
    fn error(&self, requested: bool) -> Option<FieldError> {
        if self.rules.is_empty() && self.mask.is_none() {
            return None;
        }

        if requested {
            let value = self.value.borrow();
            for rule in &self.rules {
                if let Err(msg) = rule.check(&value) {
                    return Some(FieldError::Rule(msg));
                }
            }
        }

        if self.mask.is_some() && !self.mask_complete.get() && !self.value.borrow().is_blank() {
            return Some(FieldError::MaskMismatch);
        }

        None
    }
}

/// 表单字段
pub struct FormField<V> {
    state: Rc<FieldState<V>>,
    form: FormHandle,
    _registration: Option<Registration>,
}

impl<V: FieldValue> FormField<V> {
    /// 创建字段；有规则时向表单注册
    pub fn new(form: &FormHandle, initial: V, rules: Vec<Rule<V>>) -> Self {
        Self::build(form, initial, rules, None)
    }

    /// 创建带输入掩码的字段
    pub fn with_mask(form: &FormHandle, initial: V, rules: Vec<Rule<V>>, mask: InputMask) -> Self {
        Self::build(form, initial, rules, Some(mask))
    }

    fn build(form: &FormHandle, initial: V, rules: Vec<Rule<V>>, mask: Option<InputMask>) -> Self {
        let state = Rc::new(FieldState {
            value: RefCell::new(initial),
            rules,
            mask,
            mask_complete: Cell::new(true),
            loading: Cell::new(false),
        });

        let registration = if state.rules.is_empty() {
            None
        } else {
            let probe_state = Rc::downgrade(&state);
            Some(form.register(move |requested| {
                probe_state
                    .upgrade()
                    .is_none_or(|s| !requested || s.error(requested).is_none())
            }))
        };

        Self {
            state,
            form: form.clone(),
            _registration: registration,
        }
    }

    pub fn value(&self) -> V {
        self.state.value.borrow().clone()
    }

    /// 更新值；加载中时忽略
    pub fn set_value(&self, value: V) {
        if self.state.loading.get() {
            return;
        }
        *self.state.value.borrow_mut() = value;
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.loading.set(loading);
    }

    /// 外部掩码组件报告的完整性
    pub fn set_mask_complete(&self, complete: bool) {
        self.state.mask_complete.set(complete);
    }

    /// 当前错误
    pub fn error(&self) -> Option<FieldError> {
        self.state.error(self.form.is_requested())
    }

    /// 展示用错误信息，无错误时为空字符串
    pub fn error_message(&self) -> String {
        self.error().map(|e| e.message().to_string()).unwrap_or_default()
    }

    /// 未请求校验或没有错误时有效
    pub fn is_valid(&self) -> bool {
        !self.form.is_requested() || self.error().is_none()
    }

    pub fn is_registered(&self) -> bool {
        self._registration.is_some()
    }
}

impl FormField<String> {
    /// 按掩码格式化原始输入并记录完整性；没有掩码时原样保存
    pub fn set_raw_input(&self, raw: &str) {
        if self.state.loading.get() {
            return;
        }
        match &self.state.mask {
            Some(mask) => {
                let formatted = mask.apply(raw);
                self.state.mask_complete.set(mask.is_complete(&formatted));
                self.set_value(formatted);
            }
            None => self.set_value(raw.to_string()),
        }
    }
}
