use crate::{
    DashboardStats, LoginRequest, PaymentLink, PaymentLinkRequest, PhoneLoginRequest, StatusReply,
    SubscriptionAction, SubscriptionStatus, TelegramAuthRequest, TelegramAuthResponse,
    TokenResponse, TrialActivation, UserPage,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::marker::PhantomData;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Whether requests with this method carry a JSON body.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The URL path (relative to the API base).
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// Concrete path for this request, including path parameters and query string.
    fn path(&self) -> String {
        Self::PATH.to_string()
    }
}

// =========================================================
// Auth
// =========================================================

impl ApiRequest for LoginRequest {
    type Response = TokenResponse;
    const PATH: &'static str = "/auth/login";
    const METHOD: HttpMethod = HttpMethod::Post;
}

impl ApiRequest for PhoneLoginRequest {
    type Response = TokenResponse;
    const PATH: &'static str = "/auth/login";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// Fetch the profile of the bearer of the current token.
///
/// Generic over the profile shape because the admin panel and the
/// finance tracker talk to different backends.
#[derive(Debug, Serialize)]
pub struct ProfileRequest<P> {
    #[serde(skip)]
    _profile: PhantomData<P>,
}

impl<P> ProfileRequest<P> {
    pub fn new() -> Self {
        Self {
            _profile: PhantomData,
        }
    }
}

impl<P> Default for ProfileRequest<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: DeserializeOwned> ApiRequest for ProfileRequest<P> {
    type Response = P;
    const PATH: &'static str = "/auth/me";
    const METHOD: HttpMethod = HttpMethod::Get;
}

impl ApiRequest for TelegramAuthRequest {
    type Response = TelegramAuthResponse;
    const PATH: &'static str = "/auth/telegram-auth";
    const METHOD: HttpMethod = HttpMethod::Post;
}

// =========================================================
// Subscriptions
// =========================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SubscriptionStatusRequest;

impl ApiRequest for SubscriptionStatusRequest {
    type Response = SubscriptionStatus;
    const PATH: &'static str = "/subscriptions/status";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActivateTrialRequest;

impl ApiRequest for ActivateTrialRequest {
    type Response = TrialActivation;
    const PATH: &'static str = "/subscriptions/trial";
    const METHOD: HttpMethod = HttpMethod::Post;
}

impl ApiRequest for PaymentLinkRequest {
    type Response = PaymentLink;
    const PATH: &'static str = "/subscriptions/pay";
    const METHOD: HttpMethod = HttpMethod::Post;
}

// =========================================================
// Admin
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListUsersRequest {
    pub page: u32,
    pub size: u32,
    pub search: String,
}

impl Default for ListUsersRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            search: String::new(),
        }
    }
}

impl ApiRequest for ListUsersRequest {
    type Response = UserPage;
    const PATH: &'static str = "/users/";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("page", &self.page.to_string())
            .append_pair("size", &self.size.to_string())
            .append_pair("search", &self.search)
            .finish();
        format!("{}?{}", Self::PATH, query)
    }
}

/// Grant or revoke a subscription for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSubscriptionRequest {
    #[serde(skip)]
    pub user_id: String,
    pub action: SubscriptionAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
}

impl ApiRequest for UpdateSubscriptionRequest {
    type Response = StatusReply;
    const PATH: &'static str = "/users/{id}/subscription";
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        Self::PATH.replace("{id}", &encode_segment(&self.user_id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteUserRequest {
    #[serde(skip)]
    pub user_id: String,
}

impl ApiRequest for DeleteUserRequest {
    type Response = StatusReply;
    const PATH: &'static str = "/users/{id}";
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        Self::PATH.replace("{id}", &encode_segment(&self.user_id))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DashboardStatsRequest;

impl ApiRequest for DashboardStatsRequest {
    type Response = DashboardStats;
    const PATH: &'static str = "/analytics/stats";
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// 按 URL 路径段规则编码（空格为 `%20`，`/` 为 `%2F`）
fn encode_segment(segment: &str) -> String {
    let Ok(mut url) = url::Url::parse("http://localhost/") else {
        return segment.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(segment);
    }
    url.path().trim_start_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_users_query() {
        let req = ListUsersRequest {
            page: 2,
            size: 20,
            search: "Ali Valiyev".into(),
        };
        assert_eq!(req.path(), "/users/?page=2&size=20&search=Ali+Valiyev");
    }

    #[test]
    fn test_path_params_are_encoded() {
        let req = DeleteUserRequest {
            user_id: "a/b".into(),
        };
        assert_eq!(req.path(), "/users/a%2Fb");
    }

    #[test]
    fn test_path_params_keep_space_and_plus_distinct() {
        let req = UpdateSubscriptionRequest {
            user_id: "a b+c".into(),
            action: SubscriptionAction::Revoke,
            plan: None,
            duration_days: None,
        };
        assert_eq!(req.path(), "/users/a%20b+c/subscription");

        let req = DeleteUserRequest {
            user_id: "a b".into(),
        };
        assert_eq!(req.path(), "/users/a%20b");
    }

    #[test]
    fn test_update_subscription_body_omits_user_id() {
        let req = UpdateSubscriptionRequest {
            user_id: "42".into(),
            action: SubscriptionAction::Grant,
            plan: Some("monthly".into()),
            duration_days: None,
        };
        assert_eq!(req.path(), "/users/42/subscription");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"action": "grant", "plan": "monthly"})
        );
    }

    #[test]
    fn test_body_methods() {
        assert!(HttpMethod::Post.has_body());
        assert!(HttpMethod::Put.has_body());
        assert!(!HttpMethod::Get.has_body());
        assert!(!HttpMethod::Delete.has_body());
    }
}
