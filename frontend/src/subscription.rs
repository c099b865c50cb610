//! 订阅服务
//!
//! 订阅状态、试用开通、支付链接，以及每次导航时的资料刷新。

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::session::SessionStore;
use crate::web::{HttpClient, KeyValueStore, Navigator};
use midas_shared::date::Timestamp;
use midas_shared::protocol::{ActivateTrialRequest, SubscriptionStatusRequest};
use midas_shared::{
    BillingPeriod, PaymentLink, PaymentLinkRequest, PaymentMethod, SubscriptionStatus,
    TrialActivation,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// 订阅接口
pub struct SubscriptionApi<'a, H> {
    api: &'a ApiClient<H>,
    token: Option<String>,
}

impl<'a, H: HttpClient> SubscriptionApi<'a, H> {
    pub fn new(api: &'a ApiClient<H>, token: Option<String>) -> Self {
        Self { api, token }
    }

    /// 使用会话中的 API 客户端与 Token
    pub fn for_session<P, S, N>(session: &'a SessionStore<P, H, S, N>) -> Self
    where
        P: Clone + Serialize + DeserializeOwned + 'static,
        S: KeyValueStore,
        N: Navigator,
    {
        Self::new(session.api(), session.token())
    }

    pub async fn status(&self) -> Result<SubscriptionStatus, ApiError> {
        self.api
            .call_authorized(&SubscriptionStatusRequest, self.token.as_deref())
            .await
    }

    pub async fn activate_trial(&self) -> Result<TrialActivation, ApiError> {
        let activation = self
            .api
            .call_authorized(&ActivateTrialRequest, self.token.as_deref())
            .await?;
        info!(ends_at = ?activation.ends_at, "trial activated");
        Ok(activation)
    }

    pub async fn payment_link(
        &self,
        plan_id: &str,
        period: BillingPeriod,
        payment_method: PaymentMethod,
    ) -> Result<PaymentLink, ApiError> {
        let req = PaymentLinkRequest {
            plan_id: plan_id.to_string(),
            period,
            payment_method,
        };
        self.api
            .call_authorized(&req, self.token.as_deref())
            .await
    }
}

/// 导航时强制刷新用户资料（订阅状态随资料返回）
///
/// 失败只记录日志，从不阻止导航。
pub async fn refresh_on_navigation<P, H, S, N>(session: &SessionStore<P, H, S, N>) -> bool
where
    P: Clone + Serialize + DeserializeOwned + 'static,
    H: HttpClient,
    S: KeyValueStore,
    N: Navigator,
{
    if !session.is_authenticated() {
        debug!("skipping profile refresh: not authenticated");
        return true;
    }

    if let Err(e) = session.load_user(true).await {
        warn!(error = %e, "failed to refresh user on navigation");
    }
    true
}

/// 剩余天数（向上取整），没有到期时间时返回 None
pub fn remaining_days(status: &SubscriptionStatus, now: Timestamp) -> Option<i64> {
    let ends_at = status.ends_at()?;
    let left = ends_at.as_millis() - now.as_millis();
    if left <= 0 {
        return Some(0);
    }
    Some((left + DAY_MS - 1) / DAY_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use crate::web::{MemoryStorage, MockHttpClient, RecordingNavigator};
    use midas_shared::protocol::HttpMethod;
    use midas_shared::{UserProfile, storage_keys};
    use serde_json::json;
    use std::rc::Rc;

    type TrackerSession =
        SessionStore<UserProfile, Rc<MockHttpClient>, MemoryStorage, Rc<RecordingNavigator>>;

    fn session(mock: &Rc<MockHttpClient>, token: Option<&str>) -> TrackerSession {
        let storage = MemoryStorage::new();
        if let Some(token) = token {
            storage.set(storage_keys::ACCESS_TOKEN, token);
        }
        SessionStore::new(
            ApiClient::new(mock.clone(), "/midas-api"),
            storage,
            Rc::new(RecordingNavigator::default()),
            SessionConfig::TRACKER,
        )
    }

    #[tokio::test]
    async fn test_status_uses_session_token() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            HttpMethod::Get,
            "/midas-api/subscriptions/status",
            200,
            json!({
                "is_active": true,
                "is_premium": true,
                "subscription_type": "premium",
                "subscription_ends_at": "2030-01-01T00:00:00",
                "is_trial_used": true,
                "expires_at": null
            }),
        );
        let session = session(&mock, Some("tok"));

        let status = SubscriptionApi::for_session(&session).status().await.unwrap();
        assert_eq!(status.subscription_type.as_deref(), Some("premium"));
        assert!(!status.can_start_trial());
        assert_eq!(
            mock.requests.borrow()[0].header("Authorization"),
            Some("Bearer tok")
        );
    }

    #[tokio::test]
    async fn test_payment_link_without_session() {
        let mock = Rc::new(MockHttpClient::new());
        let session = session(&mock, None);

        let err = SubscriptionApi::for_session(&session)
            .payment_link("premium", BillingPeriod::Quarter, PaymentMethod::Click)
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::MissingToken);
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_activate_trial() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            HttpMethod::Post,
            "/midas-api/subscriptions/trial",
            200,
            json!({"message": "Trial activated", "ends_at": "2030-01-04T00:00:00"}),
        );
        let session = session(&mock, Some("tok"));

        let activation = SubscriptionApi::for_session(&session)
            .activate_trial()
            .await
            .unwrap();
        assert_eq!(activation.message, "Trial activated");
    }

    #[tokio::test]
    async fn test_refresh_fails_open() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_network_failure(HttpMethod::Get, "/midas-api/auth/me");
        let session = session(&mock, Some("tok"));

        assert!(refresh_on_navigation(&session).await);
        assert!(session.is_authenticated());
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_always_forces() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            HttpMethod::Get,
            "/midas-api/auth/me",
            200,
            json!({"id": "3", "name": "Ali", "is_premium": true}),
        );
        let session = session(&mock, Some("tok"));

        assert!(refresh_on_navigation(&session).await);
        assert!(refresh_on_navigation(&session).await);
        assert_eq!(mock.request_count(), 2);
        assert!(session.user().is_some_and(|u| u.is_premium));
    }

    #[tokio::test]
    async fn test_refresh_skipped_when_logged_out() {
        let mock = Rc::new(MockHttpClient::new());
        let session = session(&mock, None);
        assert!(refresh_on_navigation(&session).await);
        assert_eq!(mock.request_count(), 0);
    }

    #[test]
    fn test_remaining_days() {
        let status = SubscriptionStatus {
            subscription_ends_at: Some("2030-01-03T00:00:00Z".into()),
            ..Default::default()
        };
        let now = midas_shared::date::parse_timestamp("2030-01-01T12:00:00Z").unwrap();
        assert_eq!(remaining_days(&status, now), Some(2));

        let later = midas_shared::date::parse_timestamp("2030-02-01T00:00:00Z").unwrap();
        assert_eq!(remaining_days(&status, later), Some(0));
        assert_eq!(remaining_days(&SubscriptionStatus::default(), now), None);
    }
}
