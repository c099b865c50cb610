//! 管理后台接口与需要确认的操作

use crate::api::ApiClient;
use crate::confirm::{ConfirmationKind, ConfirmationQueue, ConfirmationSpec};
use crate::error::ApiError;
use crate::web::HttpClient;
use midas_shared::protocol::{
    DashboardStatsRequest, DeleteUserRequest, ListUsersRequest, UpdateSubscriptionRequest,
};
use midas_shared::{DashboardStats, StatusReply, SubscriptionAction, UserPage, UserSummary};
use tracing::info;

/// 手动开通订阅时使用的套餐与时长
pub const GRANT_PLAN: &str = "premium";
pub const GRANT_DURATION_DAYS: u32 = 30;

pub struct AdminApi<'a, H> {
    api: &'a ApiClient<H>,
    token: Option<String>,
}

impl<'a, H: HttpClient> AdminApi<'a, H> {
    pub fn new(api: &'a ApiClient<H>, token: Option<String>) -> Self {
        Self { api, token }
    }

    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.api
            .call_authorized(&DashboardStatsRequest, self.token.as_deref())
            .await
    }

    pub async fn list_users(&self, query: &ListUsersRequest) -> Result<UserPage, ApiError> {
        self.api.call_authorized(query, self.token.as_deref()).await
    }

    pub async fn update_subscription(
        &self,
        user_id: &str,
        action: SubscriptionAction,
    ) -> Result<StatusReply, ApiError> {
        let req = match action {
            SubscriptionAction::Grant => UpdateSubscriptionRequest {
                user_id: user_id.to_string(),
                action,
                plan: Some(GRANT_PLAN.to_string()),
                duration_days: Some(GRANT_DURATION_DAYS),
            },
            SubscriptionAction::Revoke => UpdateSubscriptionRequest {
                user_id: user_id.to_string(),
                action,
                plan: None,
                duration_days: None,
            },
        };
        let reply = self.api.call_authorized(&req, self.token.as_deref()).await?;
        info!(user_id, ?action, "subscription updated");
        Ok(reply)
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<StatusReply, ApiError> {
        let req = DeleteUserRequest {
            user_id: user_id.to_string(),
        };
        let reply = self.api.call_authorized(&req, self.token.as_deref()).await?;
        info!(user_id, "user deleted");
        Ok(reply)
    }
}

/// 用户列表上的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Grant,
    Revoke,
    Delete,
}

impl UserAction {
    fn confirmation(&self, user: &UserSummary) -> ConfirmationSpec {
        let who = if user.name.is_empty() {
            user.id.clone()
        } else {
            user.name.clone()
        };
        match self {
            UserAction::Grant => ConfirmationSpec::new(ConfirmationKind::Success, "Grant premium?")
                .with_subtitle(format!("{} gets {} days of premium", who, GRANT_DURATION_DAYS)),
            UserAction::Revoke => ConfirmationSpec::new(ConfirmationKind::Info, "Revoke premium?")
                .with_subtitle(format!("{} loses premium access immediately", who)),
            UserAction::Delete => ConfirmationSpec::new(ConfirmationKind::Error, "Delete user?")
                .with_subtitle(format!("{} and all their data will be removed", who)),
        }
    }
}

/// 先请求确认，确认后才执行操作
///
/// 返回 `Ok(false)` 表示用户取消，未发出任何请求。
pub async fn run_confirmed<H: HttpClient>(
    queue: &ConfirmationQueue,
    admin: &AdminApi<'_, H>,
    user: &UserSummary,
    action: UserAction,
) -> Result<bool, ApiError> {
    if !queue.request(action.confirmation(user)).await {
        return Ok(false);
    }

    match action {
        UserAction::Grant => admin
            .update_subscription(&user.id, SubscriptionAction::Grant)
            .await
            .map(|_| true),
        UserAction::Revoke => admin
            .update_subscription(&user.id, SubscriptionAction::Revoke)
            .await
            .map(|_| true),
        UserAction::Delete => admin.delete_user(&user.id).await.map(|_| true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::MockHttpClient;
    use futures::FutureExt;
    use midas_shared::protocol::HttpMethod;
    use serde_json::json;
    use std::rc::Rc;

    fn user() -> UserSummary {
        serde_json::from_value(json!({"id": "u-1", "name": "Ali", "is_premium": false})).unwrap()
    }

    fn setup() -> (Rc<MockHttpClient>, ApiClient<Rc<MockHttpClient>>) {
        let mock = Rc::new(MockHttpClient::new());
        (mock.clone(), ApiClient::new(mock, "/api"))
    }

    #[tokio::test]
    async fn test_list_users_query() {
        let (mock, api) = setup();
        mock.mock_response(
            HttpMethod::Get,
            "/api/users/?page=2&size=10&search=ali+k",
            200,
            json!({"items": [{"id": "u-1", "name": "Ali K"}], "total": 11, "page": 2, "size": 10}),
        );
        let admin = AdminApi::new(&api, Some("t".into()));

        let page = admin
            .list_users(&ListUsersRequest {
                page: 2,
                search: "ali k".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.page_count(), 2);
    }

    #[tokio::test]
    async fn test_grant_sends_plan_and_duration() {
        let (mock, api) = setup();
        mock.mock_response(
            HttpMethod::Put,
            "/api/users/u-1/subscription",
            200,
            json!({"status": "success"}),
        );
        let admin = AdminApi::new(&api, Some("t".into()));

        admin
            .update_subscription("u-1", SubscriptionAction::Grant)
            .await
            .unwrap();

        let body = mock.requests.borrow()[0].body.clone().unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&body).unwrap(),
            json!({"action": "grant", "plan": "premium", "duration_days": 30})
        );
    }

    #[tokio::test]
    async fn test_rejected_confirmation_sends_nothing() {
        let (mock, api) = setup();
        let admin = AdminApi::new(&api, Some("t".into()));
        let queue = ConfirmationQueue::with_clock(|| 1);
        let target = user();

        let mut fut = Box::pin(run_confirmed(&queue, &admin, &target, UserAction::Delete));
        assert!((&mut fut).now_or_never().is_none());

        let active = queue.active();
        assert_eq!(active[0].spec.kind, ConfirmationKind::Error);
        queue.resolve(active[0].id, false);

        assert_eq!(fut.await, Ok(false));
        assert_eq!(mock.request_count(), 0);
        assert!(queue.active().is_empty());
    }

    #[tokio::test]
    async fn test_accepted_confirmation_runs_action() {
        let (mock, api) = setup();
        mock.mock_response(
            HttpMethod::Delete,
            "/api/users/u-1",
            200,
            json!({"status": "success"}),
        );
        let admin = AdminApi::new(&api, Some("t".into()));
        let queue = ConfirmationQueue::with_clock(|| 1);
        let target = user();

        let mut fut = Box::pin(run_confirmed(&queue, &admin, &target, UserAction::Delete));
        assert!((&mut fut).now_or_never().is_none());
        queue.resolve(1, true);

        assert_eq!(fut.await, Ok(true));
        assert_eq!(mock.urls(), vec!["DELETE /api/users/u-1".to_string()]);
    }
}
