//! 会话存储
//!
//! 持有当前 Token 与用户资料，是 Token 的唯一持有者。
//! - 启动时从持久化存储恢复
//! - 登录：先换取 Token，再用新 Token 拉取资料，两步都成功才提交
//! - 注销：无条件清空内存与存储，可重复调用
//!
//! 每次提交都会通知订阅者，视图层据此同步信号。

use crate::api::ApiClient;
use crate::error::AuthError;
use crate::observer::{Observers, Subscription};
use crate::web::{HttpClient, KeyValueStore, Navigator};
use midas_shared::protocol::{ApiRequest, ProfileRequest};
use midas_shared::{LoginRequest, TokenResponse, storage_keys};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use tracing::{debug, info, warn};


// =========================================================
// 会话快照
// =========================================================

/// 会话快照
///
/// 不变式：`user` 为 `Some` 时 `token` 一定为 `Some`。
#[derive(Debug, Clone, PartialEq)]
pub struct Session<P> {
    pub token: Option<String>,
    pub user: Option<P>,
}

impl<P> Session<P> {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl<P> Default for Session<P> {
    fn default() -> Self {
        Self {
            token: None,
            user: None,
        }
    }
}

/// 会话配置：存储键与跳转路径
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub token_key: &'static str,
    /// 为 None 时资料只保存在内存中
    pub user_key: Option<&'static str>,
    pub landing_path: &'static str,
    pub login_path: &'static str,
}

impl SessionConfig {
    pub const ADMIN: Self = Self {
        token_key: storage_keys::ADMIN_TOKEN,
        user_key: Some(storage_keys::ADMIN_USER),
        landing_path: "/dashboard",
        login_path: "/login",
    };

    pub const TRACKER: Self = Self {
        token_key: storage_keys::ACCESS_TOKEN,
        user_key: None,
        landing_path: "/",
        login_path: "/login",
    };
}

// =========================================================
// 会话存储
// =========================================================

pub struct SessionStore<P, H, S, N> {
    api: ApiClient<H>,
    storage: S,
    navigator: N,
    config: SessionConfig,
    state: RefCell<Session<P>>,
    observers: Observers<Session<P>>,
}

impl<P, H, S, N> SessionStore<P, H, S, N>
where
    P: Clone + Serialize + DeserializeOwned + 'static,
    H: HttpClient,
    S: KeyValueStore,
    N: Navigator,
{
    /// 创建会话存储并从持久化存储恢复状态
    pub fn new(api: ApiClient<H>, storage: S, navigator: N, config: SessionConfig) -> Self {
        let state = Self::rehydrate(&storage, &config);
        debug!(
            authenticated = state.is_authenticated(),
            has_user = state.user.is_some(),
            "session rehydrated"
        );

        Self {
            api,
            storage,
            navigator,
            config,
            state: RefCell::new(state),
            observers: Observers::new(),
        }
    }

    fn rehydrate(storage: &S, config: &SessionConfig) -> Session<P> {
        let token = storage
            .get(config.token_key)
            .filter(|t| !t.trim().is_empty());

        let Some(user_key) = config.user_key else {
            return Session { token, user: None };
        };

        let raw_user = storage.get(user_key);
        if token.is_none() {
            // 没有 Token 的资料是残留数据
            if raw_user.is_some() {
                warn!(key = user_key, "dropping stored profile without token");
                storage.delete(user_key);
            }
            return Session::default();
        }

        let user = raw_user.and_then(|raw| match serde_json::from_str::<P>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(key = user_key, error = %e, "ignoring unreadable stored profile");
                None
            }
        });

        Session { token, user }
    }

    // =========================================================
    // 读取
    // =========================================================

    pub fn snapshot(&self) -> Session<P> {
        self.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn user(&self) -> Option<P> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// 底层 API 客户端，供其他需要 Token 的模块复用
    pub fn api(&self) -> &ApiClient<H> {
        &self.api
    }

    /// 订阅会话变更，句柄被 drop 时退订
    pub fn subscribe(&self, listener: impl Fn(&Session<P>) + 'static) -> Subscription {
        self.observers.subscribe(listener)
    }

    // =========================================================
    // 登录 / 注销
    // =========================================================

    /// 用户名密码登录
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Session<P>, AuthError> {
        let req = LoginRequest {
            username: identifier.to_string(),
            password: secret.to_string(),
        };
        self.login_with(&req).await
    }

    /// 使用任意换取 Token 的请求登录
    ///
    /// 任一步失败都不改变现有状态与存储。
    pub async fn login_with<C>(&self, credentials: &C) -> Result<Session<P>, AuthError>
    where
        C: ApiRequest<Response = TokenResponse>,
    {
        let token = self
            .api
            .call(credentials, None)
            .await
            .map_err(AuthError::from_login)?
            .access_token;

        if token.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .api
            .call(&ProfileRequest::<P>::new(), Some(&token))
            .await?;

        let session = Session {
            token: Some(token),
            user: Some(user),
        };
        self.commit(session.clone());
        info!("login succeeded");

        self.navigator.navigate(self.config.landing_path);
        Ok(session)
    }

    /// 注销
    pub fn logout(&self) {
        let was_authenticated = self.is_authenticated();
        self.commit(Session::default());
        if was_authenticated {
            info!("logged out");
        }
        self.navigator.navigate(self.config.login_path);
    }

    /// 加载用户资料
    ///
    /// `force == false` 且已有缓存时直接返回缓存。
    pub async fn load_user(&self, force: bool) -> Result<P, AuthError> {
        let (token, cached) = {
            let state = self.state.borrow();
            (state.token.clone(), state.user.clone())
        };

        let Some(token) = token else {
            return Err(AuthError::NotAuthenticated);
        };

        if !force {
            if let Some(user) = cached {
                return Ok(user);
            }
        }

        let user = self
            .api
            .call(&ProfileRequest::<P>::new(), Some(&token))
            .await?;

        // 请求期间会话可能已被注销或替换
        if self.token().as_deref() == Some(token.as_str()) {
            self.commit(Session {
                token: Some(token),
                user: Some(user.clone()),
            });
        } else {
            debug!("session changed while loading profile, result discarded");
        }

        Ok(user)
    }

    /// 采用外部获得的 Token（如宿主环境换取的 Token）
    ///
    /// 资料稍后通过 `load_user(true)` 获取。
    pub fn adopt_token(&self, token: String) {
        if token.is_empty() {
            return;
        }
        self.commit(Session {
            token: Some(token),
            user: None,
        });
    }

    // =========================================================
    // 内部
    // =========================================================

    fn commit(&self, session: Session<P>) {
        self.persist(&session);
        *self.state.borrow_mut() = session.clone();
        self.observers.notify(&session);
    }

    fn persist(&self, session: &Session<P>) {
        match &session.token {
            Some(token) => {
                if !self.storage.set(self.config.token_key, token) {
                    warn!(key = self.config.token_key, "failed to persist token");
                }
            }
            None => {
                self.storage.delete(self.config.token_key);
            }
        }

        let Some(user_key) = self.config.user_key else {
            return;
        };

        match &session.user {
            Some(user) => match serde_json::to_string(user) {
                Ok(raw) => {
                    if !self.storage.set(user_key, &raw) {
                        warn!(key = user_key, "failed to persist profile");
                    }
                }
                Err(e) => warn!(error = %e, "failed to serialize profile"),
            },
            None => {
                self.storage.delete(user_key);
            }
        }
    }
}
