//! 显式观察者
//!
//! 状态持有者在每次提交变更后调用 `notify`，视图层通过 `subscribe`
//! 把快照同步进自己的信号。订阅句柄被 drop 时自动退订。

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

pub struct Observers<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> Observers<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut reg = self.registry.borrow_mut();
            let id = reg.next_id;
            reg.next_id += 1;
            reg.listeners.push((id, Rc::new(listener)));
            id
        };

        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.borrow_mut().listeners.retain(|(i, _)| *i != id);
                }
            })),
        }
    }

    /// 通知所有监听者
    ///
    /// 先复制监听者列表再调用，监听者内部可以安全地订阅或退订。
    pub fn notify(&self, value: &T) {
        let listeners: Vec<Listener<T>> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 订阅句柄
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// 放弃句柄并保持订阅，直到被观察者销毁
    pub fn forget(mut self) {
        self.cancel.take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_drop_unsubscribes() {
        let observers = Observers::<u32>::new();
        let seen = Rc::new(Cell::new(0));

        let sub = {
            let seen = seen.clone();
            observers.subscribe(move |v| seen.set(seen.get() + *v))
        };
        observers.notify(&2);
        drop(sub);
        observers.notify(&5);

        assert_eq!(seen.get(), 2);
        assert!(observers.is_empty());
    }

    #[test]
    fn test_forget_keeps_listener() {
        let observers = Observers::<u32>::new();
        let seen = Rc::new(Cell::new(0));
        {
            let seen = seen.clone();
            observers.subscribe(move |v| seen.set(*v)).forget();
        }
        observers.notify(&7);
        assert_eq!(seen.get(), 7);
    }

    #[test]
    fn test_subscription_outlives_observers() {
        let observers = Observers::<u32>::new();
        let sub = observers.subscribe(|_| {});
        drop(observers);
        drop(sub);
    }
}
