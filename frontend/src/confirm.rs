//! 确认对话框编排
//!
//! 调用方 `push` 一个确认请求并等待其结果；UI 宿主渲染 `active()` 中的请求，
//! 用户作答后调用 `resolve`。每个请求有唯一 id，对应唯一一个等待中的 future。
//! 没有超时：未作答的请求会一直等待，直到被取消或队列被销毁（此时视为拒绝）。

use crate::observer::{Observers, Subscription};
use futures::channel::oneshot;
use midas_shared::date::now_timestamp;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

// =========================================================
// 数据模型
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmationKind {
    #[default]
    Default,
    Success,
    Info,
    Error,
}

impl ConfirmationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationKind::Default => "default",
            ConfirmationKind::Success => "success",
            ConfirmationKind::Info => "info",
            ConfirmationKind::Error => "error",
        }
    }
}

/// 确认请求内容
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfirmationSpec {
    pub kind: ConfirmationKind,
    pub title: String,
    pub subtitle: String,
}

impl ConfirmationSpec {
    pub fn new(kind: ConfirmationKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            subtitle: String::new(),
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }
}

/// 队列中的确认请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub id: u64,
    pub spec: ConfirmationSpec,
}

/// 等待中的确认结果
pub struct PendingConfirmation {
    pub id: u64,
    rx: oneshot::Receiver<bool>,
}

impl PendingConfirmation {
    /// 等待用户作答
    ///
    /// 请求被取消或队列被销毁时返回 false。
    pub async fn outcome(self) -> bool {
        self.rx.await.unwrap_or(false)
    }
}

// =========================================================
// 队列
// =========================================================

struct Entry {
    request: ConfirmationRequest,
    // 作答后置为 None
    sender: Option<oneshot::Sender<bool>>,
}

struct QueueState {
    entries: Vec<Entry>,
    last_id: u64,
}

struct Inner {
    state: RefCell<QueueState>,
    clock: Box<dyn Fn() -> u64>,
    observers: Observers<Vec<ConfirmationRequest>>,
}

/// 确认请求队列
///
/// 克隆后共享同一个队列。
#[derive(Clone)]
pub struct ConfirmationQueue {
    inner: Rc<Inner>,
}

impl ConfirmationQueue {
    pub fn new() -> Self {
        Self::with_clock(|| now_timestamp().as_millis().max(0) as u64)
    }

    /// 使用自定义时钟（毫秒）创建队列
    pub fn with_clock(clock: impl Fn() -> u64 + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(QueueState {
                    entries: Vec::new(),
                    last_id: 0,
                }),
                clock: Box::new(clock),
                observers: Observers::new(),
            }),
        }
    }

    /// 入队并返回等待句柄
    ///
    /// id 取当前时间戳，与上一个 id 冲突时递增，保证严格单调。
    pub fn push(&self, spec: ConfirmationSpec) -> PendingConfirmation {
        let now = (self.inner.clock)();
        let (tx, rx) = oneshot::channel();

        let id = {
            let mut state = self.inner.state.borrow_mut();
            let id = now.max(state.last_id + 1);
            state.last_id = id;
            state.entries.push(Entry {
                request: ConfirmationRequest { id, spec },
                sender: Some(tx),
            });
            id
        };

        debug!(id, "confirmation requested");
        self.notify();
        PendingConfirmation { id, rx }
    }

    /// 以给定结果解决指定请求
    ///
    /// 未知 id 或已作答的请求返回 false。
    pub fn resolve(&self, id: u64, accepted: bool) -> bool {
        let sender = {
            let mut state = self.inner.state.borrow_mut();
            state
                .entries
                .iter_mut()
                .find(|e| e.request.id == id)
                .and_then(|e| e.sender.take())
        };

        match sender {
            Some(tx) => {
                debug!(id, accepted, "confirmation resolved");
                // 接收端已被丢弃时结果无人关心
                let _ = tx.send(accepted);
                true
            }
            None => false,
        }
    }

    /// 从活动队列中移除
    pub fn close(&self, id: u64) {
        let removed = {
            let mut state = self.inner.state.borrow_mut();
            let before = state.entries.len();
            state.entries.retain(|e| e.request.id != id);
            before != state.entries.len()
        };
        if removed {
            self.notify();
        }
    }

    /// 取消请求：以拒绝解决并移除
    pub fn cancel(&self, id: u64) {
        self.resolve(id, false);
        self.close(id);
    }

    /// 入队、等待作答、关闭
    ///
    /// Future 在作答前被丢弃时同样会关闭该请求。
    pub async fn request(&self, spec: ConfirmationSpec) -> bool {
        let pending = self.push(spec);
        let _close = CloseOnDrop {
            queue: self,
            id: pending.id,
        };
        pending.outcome().await
    }

    pub async fn request_default(&self, title: &str, subtitle: &str) -> bool {
        self.request(ConfirmationSpec::new(ConfirmationKind::Default, title).with_subtitle(subtitle))
            .await
    }

    pub async fn request_success(&self, title: &str, subtitle: &str) -> bool {
        self.request(ConfirmationSpec::new(ConfirmationKind::Success, title).with_subtitle(subtitle))
            .await
    }

    pub async fn request_info(&self, title: &str, subtitle: &str) -> bool {
        self.request(ConfirmationSpec::new(ConfirmationKind::Info, title).with_subtitle(subtitle))
            .await
    }

    pub async fn request_error(&self, title: &str, subtitle: &str) -> bool {
        self.request(ConfirmationSpec::new(ConfirmationKind::Error, title).with_subtitle(subtitle))
            .await
    }

    /// 当前活动的请求，按入队顺序
    pub fn active(&self) -> Vec<ConfirmationRequest> {
        self.inner
            .state
            .borrow()
            .entries
            .iter()
            .map(|e| e.request.clone())
            .collect()
    }

    /// 请求是否仍在等待作答
    pub fn is_pending(&self, id: u64) -> bool {
        self.inner
            .state
            .borrow()
            .entries
            .iter()
            .any(|e| e.request.id == id && e.sender.is_some())
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&Vec<ConfirmationRequest>) + 'static,
    ) -> Subscription {
        self.inner.observers.subscribe(listener)
    }

    fn notify(&self) {
        let active = self.active();
        self.inner.observers.notify(&active);
    }
}

impl Default for ConfirmationQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// 离开作用域时关闭对应的请求
struct CloseOnDrop<'a> {
    queue: &'a ConfirmationQueue,
    id: u64,
}

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        self.queue.close(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::cell::Cell;

    fn fixed_clock_queue(now: u64) -> ConfirmationQueue {
        ConfirmationQueue::with_clock(move || now)
    }

    fn spec(title: &str) -> ConfirmationSpec {
        ConfirmationSpec::new(ConfirmationKind::Default, title)
    }

    #[test]
    fn test_ids_unique_under_same_timestamp() {
        let queue = fixed_clock_queue(1_700_000_000_000);
        let a = queue.push(spec("a"));
        let b = queue.push(spec("b"));
        let c = queue.push(spec("c"));

        assert_eq!(a.id, 1_700_000_000_000);
        assert_eq!(b.id, a.id + 1);
        assert_eq!(c.id, b.id + 1);
    }

    #[test]
    fn test_ids_follow_clock() {
        let now = Rc::new(Cell::new(100));
        let queue = {
            let now = now.clone();
            ConfirmationQueue::with_clock(move || now.get())
        };
        let a = queue.push(spec("a"));
        now.set(500);
        let b = queue.push(spec("b"));
        assert_eq!((a.id, b.id), (100, 500));
    }

    #[tokio::test]
    async fn test_resolving_one_leaves_other_pending() {
        let queue = fixed_clock_queue(1);
        let first = queue.push(spec("first"));
        let second = queue.push(spec("second"));
        let (first_id, second_id) = (first.id, second.id);

        assert!(queue.resolve(first_id, true));
        assert!(first.outcome().await);

        // 第二个仍在等待，且仍在活动队列中
        assert!(queue.is_pending(second_id));
        assert_eq!(queue.active().len(), 2);
        let mut second = Box::pin(second.outcome());
        assert!((&mut second).now_or_never().is_none());

        assert!(queue.resolve(second_id, false));
        assert!(!second.await);
    }

    #[tokio::test]
    async fn test_concurrent_requests() {
        let queue = fixed_clock_queue(42);
        let q1 = queue.clone();
        let q2 = queue.clone();
        let mut first = Box::pin(async move { q1.request(spec("delete user?")).await });
        let mut second = Box::pin(async move { q2.request(spec("revoke plan?")).await });

        // 两个请求都已入队
        assert!((&mut first).now_or_never().is_none());
        assert!((&mut second).now_or_never().is_none());
        let ids: Vec<u64> = queue.active().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![42, 43]);

        assert!(queue.resolve(42, true));
        assert_eq!(first.await, true);

        // 第一个已关闭，第二个未受影响
        assert_eq!(queue.active().len(), 1);
        assert_eq!(queue.active()[0].spec.title, "revoke plan?");
        assert!((&mut second).now_or_never().is_none());

        queue.resolve(43, false);
        assert_eq!(second.await, false);
        assert!(queue.active().is_empty());
    }

    #[test]
    fn test_resolve_unknown_or_answered() {
        let queue = fixed_clock_queue(7);
        assert!(!queue.resolve(99, true));

        let pending = queue.push(spec("x"));
        assert!(queue.resolve(pending.id, true));
        assert!(!queue.resolve(pending.id, false));
        assert_eq!(pending.outcome().now_or_never(), Some(true));
    }

    #[test]
    fn test_cancel_rejects_and_removes() {
        let queue = fixed_clock_queue(7);
        let pending = queue.push(spec("x"));
        queue.cancel(pending.id);

        assert!(queue.active().is_empty());
        assert_eq!(pending.outcome().now_or_never(), Some(false));
    }

    #[test]
    fn test_dropped_queue_rejects() {
        let queue = fixed_clock_queue(7);
        let pending = queue.push(spec("x"));
        drop(queue);
        assert_eq!(pending.outcome().now_or_never(), Some(false));
    }

    #[test]
    fn test_subscribers_track_active_set() {
        let queue = fixed_clock_queue(1);
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let sizes = sizes.clone();
            queue.subscribe(move |active| sizes.borrow_mut().push(active.len()))
        };

        let a = queue.push(ConfirmationSpec::new(ConfirmationKind::Error, "a").with_subtitle("b"));
        queue.resolve(a.id, true);
        queue.close(a.id);
        // 重复关闭不再通知
        queue.close(a.id);

        assert_eq!(*sizes.borrow(), vec![1, 0]);
    }

    #[tokio::test]
    async fn test_typed_shortcut_sets_kind() {
        let queue = fixed_clock_queue(5);
        let q = queue.clone();
        let mut fut = Box::pin(async move { q.request_error("Failed", "try again").await });
        assert!((&mut fut).now_or_never().is_none());

        let active = queue.active();
        assert_eq!(active[0].spec.kind, ConfirmationKind::Error);
        assert_eq!(active[0].spec.subtitle, "try again");

        queue.resolve(5, true);
        assert!(fut.await);
    }

    #[test]
    fn test_dropped_request_closes_entry() {
        let queue = fixed_clock_queue(9);
        assert!(queue.request(spec("Delete?")).now_or_never().is_none());
        assert!(queue.active().is_empty());
        assert!(!queue.is_pending(9));
    }
}
