//! Telegram Mini-App 认证桥
//!
//! 应用挂载前运行一次：检测宿主环境，取出签名的 init data，
//! 交给后端换取访问 Token。宿主不存在、没有 init data 或交换失败时，
//! 回落到普通登录流程。失败不重试。

use crate::api::ApiClient;
use crate::error::AuthError;
use crate::web::{HttpClient, KeyValueStore};
use midas_shared::{TelegramAuthRequest, TelegramUser, storage_keys};
use tracing::{error, info, warn};

/// 宿主环境接口
pub trait HostBridge {
    /// 是否运行在 Telegram WebApp 中
    fn is_present(&self) -> bool;
    /// 通知宿主应用已就绪
    fn ready(&self);
    /// 签名的 init data
    fn init_data(&self) -> Option<String>;
    /// 未经校验的用户信息，仅用于展示
    fn unsafe_user(&self) -> Option<TelegramUser>;
}

/// 用宿主提供的 init data 换取 Token
///
/// 不在宿主中或没有 init data 时返回 `Ok(None)`。
pub async fn authenticate<B, H>(bridge: &B, api: &ApiClient<H>) -> Result<Option<String>, AuthError>
where
    B: HostBridge + ?Sized,
    H: HttpClient,
{
    if !bridge.is_present() {
        warn!("not running inside Telegram WebApp");
        return Ok(None);
    }

    bridge.ready();
    info!("Telegram WebApp initialized");

    let Some(init_data) = bridge.init_data().filter(|d| !d.is_empty()) else {
        warn!("no initData available");
        return Ok(None);
    };

    let response = api
        .call(&TelegramAuthRequest { init_data }, None)
        .await
        .map_err(|e| {
            error!(error = %e, "Telegram authentication failed");
            AuthError::HostRejected(e.to_string())
        })?;

    if response.access_token.is_empty() {
        return Err(AuthError::HostRejected("empty access token".to_string()));
    }

    info!("Telegram authentication succeeded");
    Ok(Some(response.access_token))
}

/// 启动握手的结果
#[derive(Debug, Clone, PartialEq)]
pub enum BootOutcome {
    /// 已换取 Token 并写入存储
    Authenticated,
    /// 不在宿主中或没有 init data
    Skipped,
    /// 宿主认证失败，回落到登录页
    Failed(AuthError),
}

/// 挂载前的启动握手
///
/// 成功时把 Token 写入 `access_token`，会话存储随后从存储恢复。
pub async fn boot<B, H, S>(bridge: &B, api: &ApiClient<H>, storage: &S) -> BootOutcome
where
    B: HostBridge + ?Sized,
    H: HttpClient,
    S: KeyValueStore,
{
    match authenticate(bridge, api).await {
        Ok(Some(token)) => {
            if !storage.set(storage_keys::ACCESS_TOKEN, &token) {
                warn!("failed to persist Telegram access token");
            }
            BootOutcome::Authenticated
        }
        Ok(None) => BootOutcome::Skipped,
        Err(e) => BootOutcome::Failed(e),
    }
}

/// 先完成启动握手，再调用 `mount` 挂载应用
///
/// 握手失败或跳过时同样会挂载，此时展示普通登录页。
pub async fn launch<B, H, S, M>(bridge: &B, api: &ApiClient<H>, storage: &S, mount: M) -> BootOutcome
where
    B: HostBridge + ?Sized,
    H: HttpClient,
    S: KeyValueStore,
    M: FnOnce(),
{
    let outcome = boot(bridge, api, storage).await;
    match &outcome {
        BootOutcome::Authenticated => info!("signed in through Telegram"),
        BootOutcome::Skipped => {}
        BootOutcome::Failed(e) => warn!(error = %e, "Telegram sign-in failed, showing login"),
    }
    mount();
    outcome
}

/// 宿主提供的用户信息（未认证，仅作展示提示）
pub fn telegram_user<B: HostBridge + ?Sized>(bridge: &B) -> Option<TelegramUser> {
    if !bridge.is_present() {
        return None;
    }
    bridge.unsafe_user()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::{MemoryStorage, MockHttpClient};
    use midas_shared::protocol::HttpMethod;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    const AUTH_URL: &str = "/midas-api/auth/telegram-auth";

    #[derive(Default)]
    struct FakeBridge {
        present: bool,
        init_data: Option<String>,
        user: Option<TelegramUser>,
        ready_calls: Cell<u32>,
    }

    impl FakeBridge {
        fn in_host(init_data: &str) -> Self {
            Self {
                present: true,
                init_data: Some(init_data.to_string()),
                ..Default::default()
            }
        }
    }

    impl HostBridge for FakeBridge {
        fn is_present(&self) -> bool {
            self.present
        }

        fn ready(&self) {
            self.ready_calls.set(self.ready_calls.get() + 1);
        }

        fn init_data(&self) -> Option<String> {
            self.init_data.clone()
        }

        fn unsafe_user(&self) -> Option<TelegramUser> {
            self.user.clone()
        }
    }

    fn api() -> (Rc<MockHttpClient>, ApiClient<Rc<MockHttpClient>>) {
        let mock = Rc::new(MockHttpClient::new());
        (mock.clone(), ApiClient::new(mock, "/midas-api"))
    }

    #[tokio::test]
    async fn test_outside_host_returns_none_without_request() {
        let (mock, api) = api();
        let bridge = FakeBridge::default();

        assert_eq!(authenticate(&bridge, &api).await, Ok(None));
        assert_eq!(mock.request_count(), 0);
        assert_eq!(bridge.ready_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_empty_init_data_returns_none() {
        let (mock, api) = api();
        let bridge = FakeBridge::in_host("");

        assert_eq!(authenticate(&bridge, &api).await, Ok(None));
        assert_eq!(bridge.ready_calls.get(), 1);
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_exchanges_init_data_for_token() {
        let (mock, api) = api();
        mock.mock_response(
            HttpMethod::Post,
            AUTH_URL,
            200,
            json!({"access_token": "tg-token", "token_type": "bearer", "user": null}),
        );
        let bridge = FakeBridge::in_host("query_id=1&hash=abc");

        let token = authenticate(&bridge, &api).await.unwrap();
        assert_eq!(token.as_deref(), Some("tg-token"));

        let body = mock.requests.borrow()[0].body.clone().unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&body).unwrap(),
            json!({"init_data": "query_id=1&hash=abc"})
        );
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried() {
        let (mock, api) = api();
        mock.mock_response(
            HttpMethod::Post,
            AUTH_URL,
            401,
            json!({"detail": "Invalid init data"}),
        );
        let bridge = FakeBridge::in_host("bad");

        let err = authenticate(&bridge, &api).await.unwrap_err();
        assert!(matches!(err, AuthError::HostRejected(ref m) if m.contains("Invalid init data")));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_boot_persists_token() {
        let (mock, api) = api();
        mock.mock_response(
            HttpMethod::Post,
            AUTH_URL,
            200,
            json!({"access_token": "tg-token", "token_type": "bearer"}),
        );
        let storage = MemoryStorage::new();

        let outcome = boot(&FakeBridge::in_host("ok"), &api, &storage).await;
        assert_eq!(outcome, BootOutcome::Authenticated);
        assert_eq!(
            storage.get(storage_keys::ACCESS_TOKEN).as_deref(),
            Some("tg-token")
        );
    }

    #[tokio::test]
    async fn test_boot_failure_falls_through() {
        let (mock, api) = api();
        mock.mock_network_failure(HttpMethod::Post, AUTH_URL);
        let storage = MemoryStorage::new();

        let outcome = boot(&FakeBridge::in_host("ok"), &api, &storage).await;
        assert!(matches!(outcome, BootOutcome::Failed(AuthError::HostRejected(_))));
        assert!(storage.is_empty());

        let skipped = boot(&FakeBridge::default(), &api, &storage).await;
        assert_eq!(skipped, BootOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_launch_mounts_after_token_is_stored() {
        let (mock, api) = api();
        mock.mock_response(
            HttpMethod::Post,
            AUTH_URL,
            200,
            json!({"access_token": "tg-token", "token_type": "bearer"}),
        );
        let storage = MemoryStorage::new();
        let token_at_mount = RefCell::new(None);

        let outcome = launch(&FakeBridge::in_host("ok"), &api, &storage, || {
            *token_at_mount.borrow_mut() = Some(storage.get(storage_keys::ACCESS_TOKEN));
        })
        .await;

        assert_eq!(outcome, BootOutcome::Authenticated);
        assert_eq!(*token_at_mount.borrow(), Some(Some("tg-token".to_string())));
    }

    #[tokio::test]
    async fn test_launch_mounts_when_boot_fails_or_skips() {
        let (mock, api) = api();
        mock.mock_network_failure(HttpMethod::Post, AUTH_URL);
        let storage = MemoryStorage::new();
        let mounts = Cell::new(0);

        let failed = launch(&FakeBridge::in_host("ok"), &api, &storage, || {
            mounts.set(mounts.get() + 1)
        })
        .await;
        assert!(matches!(failed, BootOutcome::Failed(_)));

        let skipped = launch(&FakeBridge::default(), &api, &storage, || {
            mounts.set(mounts.get() + 1)
        })
        .await;
        assert_eq!(skipped, BootOutcome::Skipped);
        assert_eq!(mounts.get(), 2);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_telegram_user_requires_host() {
        let user = TelegramUser {
            id: 42,
            first_name: "Ali".into(),
            last_name: None,
            username: Some("ali".into()),
            language_code: None,
        };
        let mut bridge = FakeBridge {
            user: Some(user.clone()),
            ..Default::default()
        };
        assert_eq!(telegram_user(&bridge), None);

        bridge.present = true;
        assert_eq!(telegram_user(&bridge), Some(user));
    }
}
